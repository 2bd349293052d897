use super::*;

#[test]
fn default_is_empty() {
    let s = SessionState::default();
    assert!(s.selected_folder.is_none());
    assert!(s.viewed_text.is_none());
    assert!(!s.upload_modal_open);
    assert!(!s.text_modal_open);
    assert!(!s.loading);
}

#[test]
fn select_then_switch_folder_closes_viewer() {
    let mut s = SessionState::default();
    let (f1, f2, item) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    s.select_folder(f1);
    s.view_text(item);
    assert_eq!(s.viewed_text, Some(item));

    s.select_folder(f2);
    assert_eq!(s.selected_folder, Some(f2));
    assert!(s.viewed_text.is_none());
}

#[test]
fn reselecting_same_folder_keeps_viewer() {
    let mut s = SessionState::default();
    let (folder, item) = (Uuid::new_v4(), Uuid::new_v4());
    s.select_folder(folder);
    s.view_text(item);
    s.select_folder(folder);
    assert_eq!(s.viewed_text, Some(item));
}

#[test]
fn view_text_requires_selection() {
    let mut s = SessionState::default();
    s.view_text(Uuid::new_v4());
    assert!(s.viewed_text.is_none());
}

#[test]
fn clear_selection_closes_viewer() {
    let mut s = SessionState::default();
    s.select_folder(Uuid::new_v4());
    s.view_text(Uuid::new_v4());
    s.clear_selection();
    assert!(s.selected_folder.is_none());
    assert!(s.viewed_text.is_none());
}

#[test]
fn item_deleted_closes_only_matching_viewer() {
    let mut s = SessionState::default();
    let (folder, item) = (Uuid::new_v4(), Uuid::new_v4());
    s.select_folder(folder);
    s.view_text(item);

    s.item_deleted(Uuid::new_v4());
    assert_eq!(s.viewed_text, Some(item));

    s.item_deleted(item);
    assert!(s.viewed_text.is_none());
}

#[test]
fn folder_deleted_clears_only_matching_selection() {
    let mut s = SessionState::default();
    let selected = Uuid::new_v4();
    s.select_folder(selected);

    s.folder_deleted(Uuid::new_v4());
    assert_eq!(s.selected_folder, Some(selected));

    s.folder_deleted(selected);
    assert!(s.selected_folder.is_none());
}
