//! Session state — transient UI state that is never persisted.
//!
//! Selection, the open text viewer, modal visibility, and the blocking
//! loading flag. The viewer is only meaningful while a folder is selected;
//! every transition that drops the selection also closes the viewer.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use uuid::Uuid;

/// Per-session transient state. At most one folder selected, at most one
/// text item viewed within it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub selected_folder: Option<Uuid>,
    pub viewed_text: Option<Uuid>,
    pub upload_modal_open: bool,
    pub text_modal_open: bool,
    /// Gates the full-screen blocking indicator during uploads.
    pub loading: bool,
}

impl SessionState {
    /// Select a folder. Selecting a different folder closes the viewer.
    pub fn select_folder(&mut self, folder_id: Uuid) {
        if self.selected_folder != Some(folder_id) {
            self.viewed_text = None;
        }
        self.selected_folder = Some(folder_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_folder = None;
        self.viewed_text = None;
    }

    /// Open the text viewer on an item. No-op without a selected folder.
    pub fn view_text(&mut self, item_id: Uuid) {
        if self.selected_folder.is_some() {
            self.viewed_text = Some(item_id);
        }
    }

    pub fn close_viewer(&mut self) {
        self.viewed_text = None;
    }

    /// React to an item deletion: close the viewer if it showed that item.
    pub fn item_deleted(&mut self, item_id: Uuid) {
        if self.viewed_text == Some(item_id) {
            self.viewed_text = None;
        }
    }

    /// React to a folder deletion: drop the selection if it was selected.
    pub fn folder_deleted(&mut self, folder_id: Uuid) {
        if self.selected_folder == Some(folder_id) {
            self.clear_selection();
        }
    }
}
