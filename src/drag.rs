//! Folder drag gesture — the Idle → Dragging → Idle state machine.
//!
//! Entirely local and ephemeral. On begin, the pointer's offset from the
//! folder's current position is captured; each move yields a clamped
//! candidate position which the caller persists through `move_folder`, so
//! every intermediate drag frame lands remotely, not just the final drop.
//! Release performs no additional persistence.

#[cfg(test)]
#[path = "drag_test.rs"]
mod tests;

use uuid::Uuid;

use crate::model::Position;

/// Active gesture, carrying the context captured at pointer-down.
#[derive(Debug, Clone, Copy, Default)]
pub enum DragState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A folder is being dragged.
    Dragging {
        /// Id of the folder under the pointer.
        folder_id: Uuid,
        /// Pointer offset from the folder position, captured at drag start.
        offset: Position,
    },
}

/// Tracks one drag gesture at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self { state: DragState::Idle }
    }

    /// Pointer-down on a folder: capture the offset and enter `Dragging`.
    pub fn begin(&mut self, folder_id: Uuid, folder_position: Position, pointer: Position) {
        let offset = Position::new(pointer.x - folder_position.x, pointer.y - folder_position.y);
        self.state = DragState::Dragging { folder_id, offset };
    }

    /// Pointer-move: candidate position for the dragged folder, clamped to
    /// the board bounds. `None` while idle, and for the (0, 0) artifact
    /// event browsers emit at the end of a drag.
    #[must_use]
    pub fn update(&self, pointer: Position) -> Option<(Uuid, Position)> {
        let DragState::Dragging { folder_id, offset } = self.state else {
            return None;
        };
        #[allow(clippy::float_cmp)]
        if pointer.x == 0.0 && pointer.y == 0.0 {
            return None;
        }
        let candidate = Position::new(pointer.x - offset.x, pointer.y - offset.y).clamped();
        Some((folder_id, candidate))
    }

    /// Pointer-up: back to `Idle`.
    pub fn end(&mut self) {
        self.state = DragState::Idle;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }
}
