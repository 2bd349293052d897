use super::*;
use uuid::Uuid;

fn folder_at(x: f64, y: f64) -> Folder {
    Folder {
        id: Uuid::new_v4(),
        name: "f".into(),
        position: Position::new(x, y),
        items: Vec::new(),
        created_at: 0,
    }
}

#[test]
fn coincident_points_give_zero_length_and_angle() {
    let t = connector_transform(Position::new(10.0, 10.0), Position::new(10.0, 10.0));
    assert!(t.length.abs() < f64::EPSILON);
    assert!(t.angle_deg.abs() < f64::EPSILON);
}

#[test]
fn horizontal_segment() {
    let t = connector_transform(Position::new(0.0, 0.0), Position::new(100.0, 0.0));
    assert!((t.length - 100.0).abs() < f64::EPSILON);
    assert!(t.angle_deg.abs() < f64::EPSILON);
}

#[test]
fn vertical_segment_is_ninety_degrees() {
    let t = connector_transform(Position::new(0.0, 0.0), Position::new(0.0, 100.0));
    assert!((t.length - 100.0).abs() < f64::EPSILON);
    assert!((t.angle_deg - 90.0).abs() < f64::EPSILON);
}

#[test]
fn diagonal_segment() {
    let t = connector_transform(Position::new(0.0, 0.0), Position::new(30.0, 40.0));
    assert!((t.length - 50.0).abs() < 1e-9);
    assert!((t.angle_deg - 53.130_102_354_155_98).abs() < 1e-9);
}

#[test]
fn resolve_center_sentinel() {
    let p = resolve_endpoint(Endpoint::BoardCenter, &[]).unwrap();
    assert!((p.x - 50.0).abs() < f64::EPSILON);
    assert!((p.y - 50.0).abs() < f64::EPSILON);
}

#[test]
fn resolve_folder_endpoint() {
    let folder = folder_at(12.0, 88.0);
    let p = resolve_endpoint(Endpoint::Folder(folder.id), std::slice::from_ref(&folder)).unwrap();
    assert!((p.x - 12.0).abs() < f64::EPSILON);
    assert!((p.y - 88.0).abs() < f64::EPSILON);
}

#[test]
fn resolve_missing_folder_is_none() {
    let folder = folder_at(12.0, 88.0);
    assert!(resolve_endpoint(Endpoint::Folder(Uuid::new_v4()), &[folder]).is_none());
}
