//! In-memory backend — document, blob, and identity stand-ins.
//!
//! DESIGN
//! ======
//! The demo and test backend for the remote services. Collections live in a
//! map behind a `tokio::sync::RwLock`; every mutation re-pushes the full
//! document list to all live subscribers, so consumers see exactly the
//! push-based full-snapshot contract of the real store.
//!
//! Fan-out is best-effort `try_send` into bounded channels: a subscriber
//! that stopped draining loses intermediate snapshots (never the invariant
//! that the *latest* state is eventually pushed again on the next change),
//! and closed channels are pruned before each push.

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc, watch};
use tracing::debug;

use super::{
    BlobPath, BlobStore, CollectionPath, Document, DocumentStore, Fields, IdentityProvider,
    Snapshot, StoreError, Subscription,
};

const DEFAULT_SNAPSHOT_QUEUE_CAPACITY: usize = 64;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// DOCUMENT STORE
// =============================================================================

#[derive(Default)]
struct CollectionState {
    /// Documents keyed by id; BTreeMap keeps snapshot order stable.
    docs: BTreeMap<String, Fields>,
    subscribers: Vec<mpsc::Sender<Snapshot>>,
}

impl CollectionState {
    fn snapshot(&self) -> Snapshot {
        self.docs
            .iter()
            .map(|(id, fields)| Document { id: id.clone(), fields: fields.clone() })
            .collect()
    }

    /// Push the current snapshot to every live subscriber.
    fn push(&mut self) {
        self.subscribers.retain(|tx| !tx.is_closed());
        let snapshot = self.snapshot();
        for tx in &self.subscribers {
            // Best-effort: a full queue drops this snapshot for that
            // subscriber; the next change pushes a fresher one anyway.
            let _ = tx.try_send(snapshot.clone());
        }
    }
}

/// In-memory document store with push-based full-snapshot subscriptions.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<CollectionPath, CollectionState>>,
    queue_capacity: usize,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            queue_capacity: env_parse("SNAPSHOT_QUEUE_CAPACITY", DEFAULT_SNAPSHOT_QUEUE_CAPACITY),
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn subscribe(&self, path: &CollectionPath) -> Subscription {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let mut collections = self.collections.write().await;
        let state = collections.entry(path.clone()).or_default();
        // Initial snapshot, delivered before any subsequent change.
        let _ = tx.try_send(state.snapshot());
        state.subscribers.push(tx);
        debug!(%path, subscribers = state.subscribers.len(), "collection subscribed");
        Subscription::new(rx)
    }

    async fn upsert_replace(&self, path: &CollectionPath, doc_id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let state = collections.entry(path.clone()).or_default();
        state.docs.insert(doc_id.to_string(), fields);
        state.push();
        Ok(())
    }

    async fn upsert_merge(&self, path: &CollectionPath, doc_id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let state = collections.entry(path.clone()).or_default();
        let doc = state.docs.entry(doc_id.to_string()).or_default();
        for (key, value) in fields {
            doc.insert(key, value);
        }
        state.push();
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, doc_id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let Some(state) = collections.get_mut(path) else {
            return Ok(());
        };
        if state.docs.remove(doc_id).is_some() {
            state.push();
        }
        Ok(())
    }
}

// =============================================================================
// BLOB STORE
// =============================================================================

/// In-memory blob store. Retrieval URLs use the `memory://` scheme.
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self { blobs: RwLock::new(HashMap::new()) }
    }

    /// Number of stored blobs. Test/diagnostic accessor.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &BlobPath, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut blobs = self.blobs.write().await;
        debug!(%path, size = bytes.len(), "blob stored");
        blobs.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn retrieval_url(&self, path: &BlobPath) -> Result<String, StoreError> {
        let blobs = self.blobs.read().await;
        let key = path.to_string();
        if blobs.contains_key(&key) {
            Ok(format!("memory://{key}"))
        } else {
            Err(StoreError::BlobNotFound(key))
        }
    }

    async fn delete(&self, path: &BlobPath) -> Result<(), StoreError> {
        let mut blobs = self.blobs.write().await;
        let key = path.to_string();
        if blobs.remove(&key).is_some() {
            Ok(())
        } else {
            Err(StoreError::BlobNotFound(key))
        }
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// In-memory identity provider driven by explicit sign-in / sign-out calls.
pub struct MemoryIdentity {
    tx: watch::Sender<Option<String>>,
}

impl MemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn sign_in(&self, principal: &str) {
        self.tx.send_replace(Some(principal.to_string()));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MemoryIdentity {
    fn current_principal(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
