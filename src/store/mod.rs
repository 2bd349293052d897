//! Store — capability traits for the three remote collaborators.
//!
//! DESIGN
//! ======
//! The document store, blob store, and identity provider are external
//! services. This module defines the narrow interfaces the board core needs
//! from them, as trait objects constructed once at startup and injected into
//! the [`crate::board::BoardManager`] — never reached as ambient globals.
//!
//! A collection subscription is a cancellable stream of *full* snapshots:
//! the complete ordered document list is pushed on open and on every change,
//! never an incremental delta. Dropping the [`Subscription`] unsubscribes.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Flat key-value document payload. Alias to reduce noise in signatures.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// One document in a collection: store-level id plus its field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// The full current content of a subscribed collection.
pub type Snapshot = Vec<Document>;

/// Errors produced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("blob not found: {0}")]
    BlobNotFound(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

// =============================================================================
// PATHS
// =============================================================================

/// The two per-user collections the board core subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Folders,
    Connections,
}

impl CollectionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folders => "folders",
            Self::Connections => "connections",
        }
    }
}

/// Address of a per-user collection: `users/{principal}/{collection}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    principal: String,
    collection: CollectionKind,
}

impl CollectionPath {
    #[must_use]
    pub fn folders(principal: &str) -> Self {
        Self { principal: principal.to_string(), collection: CollectionKind::Folders }
    }

    #[must_use]
    pub fn connections(principal: &str) -> Self {
        Self { principal: principal.to_string(), collection: CollectionKind::Connections }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "users/{}/{}", self.principal, self.collection.as_str())
    }
}

/// Address of a blob: `users/{principal}/{blob_id}`. The blob id always
/// matches the id of the item it backs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath {
    principal: String,
    blob_id: Uuid,
}

impl BlobPath {
    #[must_use]
    pub fn new(principal: &str, blob_id: Uuid) -> Self {
        Self { principal: principal.to_string(), blob_id }
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "users/{}/{}", self.principal, self.blob_id)
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Live snapshot stream for one collection.
///
/// The first snapshot arrives immediately after subscribing. Dropping the
/// subscription cancels it; the backend prunes the dead channel on its next
/// push.
pub struct Subscription {
    rx: mpsc::Receiver<Snapshot>,
}

impl Subscription {
    #[must_use]
    pub(crate) fn new(rx: mpsc::Receiver<Snapshot>) -> Self {
        Self { rx }
    }

    /// Receive the next full snapshot. `None` once the backend shuts down.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================

/// The hierarchical document database. Writes are per-document upserts;
/// `upsert_merge` updates only the given top-level fields.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a live snapshot subscription on a collection.
    async fn subscribe(&self, path: &CollectionPath) -> Subscription;

    /// Write a full document, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend rejects the write.
    async fn upsert_replace(&self, path: &CollectionPath, doc_id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Merge the given fields into a document, creating it if absent.
    /// Untouched fields keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend rejects the write.
    async fn upsert_merge(&self, path: &CollectionPath, doc_id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend rejects the delete.
    async fn delete(&self, path: &CollectionPath, doc_id: &str) -> Result<(), StoreError>;
}

/// Content-addressable file storage keyed by blob path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the bytes under the given path.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the upload fails.
    async fn upload(&self, path: &BlobPath, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Resolve the retrieval URL for a stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BlobNotFound`] if nothing is stored there.
    async fn retrieval_url(&self, path: &BlobPath) -> Result<String, StoreError>;

    /// Delete a stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BlobNotFound`] if nothing is stored there.
    async fn delete(&self, path: &BlobPath) -> Result<(), StoreError>;
}

/// Supplies the current authenticated principal and its transitions.
pub trait IdentityProvider: Send + Sync {
    /// The stable identifier of the signed-in principal, if any.
    fn current_principal(&self) -> Option<String>;

    /// Watch sign-in / sign-out transitions.
    fn watch(&self) -> watch::Receiver<Option<String>>;
}
