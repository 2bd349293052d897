//! Domain model — folders, items, connections, and positions.
//!
//! DESIGN
//! ======
//! These types mirror the documents held by the remote store. Documents are
//! flat JSON field maps; encoding goes through [`serde_json`] and decoding
//! tolerates the legacy shapes the store may still contain (a folder without
//! a `position`, a connection without a `color`). The document id is always
//! authoritative — an `id` field embedded in the document body is written
//! for compatibility but ignored on decode.

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    BOARD_CENTER_KEY, DEFAULT_CONNECTION_COLOR, POSITION_MAX, POSITION_MIN, SPAWN_MAX, SPAWN_MIN,
};
use crate::store::Fields;

// =============================================================================
// ERROR
// =============================================================================

/// A document in a snapshot could not be decoded into a model type.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The document id (or an embedded endpoint) is not a valid UUID.
    #[error("invalid identifier: {0}")]
    Id(#[from] uuid::Error),
    /// The document fields do not match the expected shape.
    #[error("invalid document fields: {0}")]
    Fields(#[from] serde_json::Error),
}

// =============================================================================
// POSITION
// =============================================================================

/// A point on the board, both axes in percent of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes to the board bounds. Idempotent.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(POSITION_MIN, POSITION_MAX),
            y: self.y.clamp(POSITION_MIN, POSITION_MAX),
        }
    }

    /// Random spawn position for a new folder, away from the canvas edges.
    #[must_use]
    pub fn random_spawn() -> Self {
        let mut rng = rand::rng();
        Self {
            x: rng.random_range(SPAWN_MIN..SPAWN_MAX),
            y: rng.random_range(SPAWN_MIN..SPAWN_MAX),
        }
    }
}

// =============================================================================
// ITEM
// =============================================================================

/// A unit of content inside a folder.
///
/// `Image` and `File` are backed by a blob store entry under the same id;
/// a `Text` note lives entirely in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Image { id: Uuid, name: String, url: String, created_at: i64 },
    File { id: Uuid, name: String, url: String, created_at: i64 },
    Text { id: Uuid, title: String, content: String, created_at: i64 },
}

impl Item {
    /// Build a blob-backed item from an upload, classified by media type.
    #[must_use]
    pub fn from_upload(id: Uuid, name: String, url: String, content_type: &str, created_at: i64) -> Self {
        match ItemKind::classify(content_type) {
            ItemKind::Image => Self::Image { id, name, url, created_at },
            ItemKind::File | ItemKind::Text => Self::File { id, name, url, created_at },
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Image { id, .. } | Self::File { id, .. } | Self::Text { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Image { .. } => ItemKind::Image,
            Self::File { .. } => ItemKind::File,
            Self::Text { .. } => ItemKind::Text,
        }
    }

    /// Whether deleting this item must also delete a blob store entry.
    #[must_use]
    pub fn is_blob_backed(&self) -> bool {
        self.kind().is_blob_backed()
    }
}

/// Discriminant of [`Item`], used where only the kind matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Image,
    File,
    Text,
}

impl ItemKind {
    /// Classify an upload by its declared media type. Never returns `Text`:
    /// `image/*` uploads become images, everything else a generic file.
    #[must_use]
    pub fn classify(content_type: &str) -> Self {
        if content_type.starts_with("image/") { Self::Image } else { Self::File }
    }

    #[must_use]
    pub fn is_blob_backed(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Move the item at `from` to `to`, shifting the items in between.
///
/// This is the drag-and-drop reorder: remove at `from`, reinsert at `to`.
/// `from == to` and out-of-range indices leave the sequence unchanged.
pub fn move_item(items: &mut Vec<Item>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

// =============================================================================
// FOLDER
// =============================================================================

/// A user-created container positioned freely on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub position: Position,
    /// Ordered item sequence; order is display/drag order.
    pub items: Vec<Item>,
    pub created_at: i64,
}

/// Wire shape of a folder document. `position` may be absent in legacy
/// documents; an embedded `id` field is ignored.
#[derive(Deserialize)]
struct FolderDoc {
    name: String,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    created_at: i64,
}

impl Folder {
    /// Decode a folder document.
    ///
    /// A document without a stored position gets `prior_position` (the
    /// locally held position from the previous snapshot) or, failing that, a
    /// fresh random spawn. The generated position is local-only: it is not
    /// written back until the folder is next explicitly moved.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Fields`] if the fields don't match the shape.
    pub fn decode(id: Uuid, fields: &Fields, prior_position: Option<Position>) -> Result<Self, DecodeError> {
        let doc: FolderDoc = serde_json::from_value(serde_json::Value::Object(fields.clone()))?;
        let position = doc
            .position
            .or(prior_position)
            .unwrap_or_else(Position::random_spawn);
        Ok(Self { id, name: doc.name, position, items: doc.items, created_at: doc.created_at })
    }

    /// Encode as a flat document field map.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        to_fields(self)
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

/// One end of a connection: a folder, or the board center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Endpoint {
    BoardCenter,
    Folder(Uuid),
}

impl Endpoint {
    /// Whether this endpoint references the given folder.
    #[must_use]
    pub fn references(self, folder_id: Uuid) -> bool {
        matches!(self, Self::Folder(id) if id == folder_id)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::BoardCenter => BOARD_CENTER_KEY.to_string(),
            Endpoint::Folder(id) => id.to_string(),
        }
    }
}

impl TryFrom<String> for Endpoint {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == BOARD_CENTER_KEY {
            Ok(Self::BoardCenter)
        } else {
            Uuid::parse_str(&value).map(Self::Folder)
        }
    }
}

/// A colored directed link between two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub source: Endpoint,
    pub target: Endpoint,
    pub color: String,
    pub created_at: i64,
}

#[derive(Deserialize)]
struct ConnectionDoc {
    source: Endpoint,
    target: Endpoint,
    #[serde(default = "default_color")]
    color: String,
    #[serde(default)]
    created_at: i64,
}

fn default_color() -> String {
    DEFAULT_CONNECTION_COLOR.to_string()
}

impl Connection {
    /// Decode a connection document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Fields`] if the fields don't match the shape
    /// (including an endpoint that is neither a UUID nor the center sentinel).
    pub fn decode(id: Uuid, fields: &Fields) -> Result<Self, DecodeError> {
        let doc: ConnectionDoc = serde_json::from_value(serde_json::Value::Object(fields.clone()))?;
        Ok(Self { id, source: doc.source, target: doc.target, color: doc.color, created_at: doc.created_at })
    }

    /// Encode as a flat document field map.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        to_fields(self)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn to_fields<T: Serialize>(value: &T) -> Fields {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Fields::new(),
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
