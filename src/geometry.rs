//! Connector geometry — pure math for rendering a string between two points.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;

use crate::consts::{BOARD_CENTER_X, BOARD_CENTER_Y};
use crate::model::{Endpoint, Folder, Position};

/// Length and rotation of a connector segment, as applied to its transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorTransform {
    /// Segment length in percentage units.
    pub length: f64,
    /// Rotation from the positive x axis, in degrees.
    pub angle_deg: f64,
}

/// Compute the transform for a connector drawn from `source` to `target`.
///
/// Always finite for finite inputs; two identical points yield a zero-length
/// segment at angle zero.
#[must_use]
pub fn connector_transform(source: Position, target: Position) -> ConnectorTransform {
    let dx = target.x - source.x;
    let dy = target.y - source.y;
    ConnectorTransform { length: dx.hypot(dy), angle_deg: dy.atan2(dx).to_degrees() }
}

/// Resolve a connection endpoint to board coordinates.
///
/// The board-center sentinel maps to (50, 50). Returns `None` for a folder
/// endpoint whose folder is no longer present (a connection mid-cascade).
#[must_use]
pub fn resolve_endpoint(endpoint: Endpoint, folders: &[Folder]) -> Option<Position> {
    match endpoint {
        Endpoint::BoardCenter => Some(Position::new(BOARD_CENTER_X, BOARD_CENTER_Y)),
        Endpoint::Folder(id) => folders.iter().find(|f| f.id == id).map(|f| f.position),
    }
}
