//! Board state manager — reconciliation and mutations.
//!
//! DESIGN
//! ======
//! The manager owns the in-memory mirror of the signed-in user's folders and
//! connections plus the transient session state, all behind one `RwLock`.
//! Two live subscriptions (folders, connections) push full snapshots; each
//! snapshot wholly replaces the matching local collection. Mutations are
//! fire-and-observe: a write's effect is only seen when the store pushes the
//! next snapshot — there is no speculative local merge.
//!
//! ERROR HANDLING
//! ==============
//! Operations return `Result` and never retry. Inside a folder-delete
//! cascade, blob and connection deletions log individual failures and
//! continue; only the folder-document deletion itself surfaces. Item
//! deletion follows the same policy: a failed blob delete is logged and the
//! document-level removal proceeds. The `on_*` intent layer is the outer
//! boundary — it logs every remaining error and propagates none.

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::consts::DEFAULT_CONNECTION_COLOR;
use crate::model::{Connection, Endpoint, Folder, Item, ItemKind, Position, now_ms};
use crate::session::SessionState;
use crate::store::{
    BlobPath, BlobStore, CollectionPath, Document, DocumentStore, Fields, IdentityProvider,
    StoreError,
};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Everything the presentation layer renders, behind one lock.
#[derive(Debug, Default)]
pub struct BoardData {
    pub folders: Vec<Folder>,
    pub connections: Vec<Connection>,
    pub session: SessionState,
}

/// File payload handed over by the upload picker.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub name: String,
    /// Declared media type; `image/*` classifies the item as an image.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Folder context-menu actions.
#[derive(Debug, Clone)]
pub enum FolderAction {
    /// String a connector from the board center to this folder.
    Connect { color: String },
    /// Delete the folder and everything it owns.
    Delete,
}

// =============================================================================
// MANAGER
// =============================================================================

/// Owns board state and every mutation against the remote stores.
///
/// Constructed with the three capability handles; holds no ambient globals.
/// `start`/`stop` manage the subscription lifecycle; [`spawn_session_task`]
/// drives them from identity transitions.
pub struct BoardManager {
    identity: Arc<dyn IdentityProvider>,
    docs: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    data: Arc<RwLock<BoardData>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BoardManager {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, docs: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            identity,
            docs,
            blobs,
            data: Arc::new(RwLock::new(BoardData::default())),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Shared board data for rendering.
    #[must_use]
    pub fn data(&self) -> &RwLock<BoardData> {
        &self.data
    }

    fn principal(&self) -> Option<String> {
        self.identity.current_principal()
    }

    // =========================================================================
    // SUBSCRIPTION LIFECYCLE
    // =========================================================================

    /// Open live subscriptions for the current principal and spawn one
    /// reconcile task per collection. No-op without a principal. Restarting
    /// while already started closes the previous subscriptions first.
    pub async fn start(&self) {
        let Some(principal) = self.principal() else {
            debug!("start skipped: no principal");
            return;
        };
        self.stop().await;

        let mut folder_sub = self.docs.subscribe(&CollectionPath::folders(&principal)).await;
        let mut connection_sub = self.docs.subscribe(&CollectionPath::connections(&principal)).await;

        let data = Arc::clone(&self.data);
        let folders_task = tokio::spawn(async move {
            while let Some(snapshot) = folder_sub.recv().await {
                let mut d = data.write().await;
                let next = reconcile_folders(&d.folders, &snapshot);
                d.folders = next;
            }
        });

        let data = Arc::clone(&self.data);
        let connections_task = tokio::spawn(async move {
            while let Some(snapshot) = connection_sub.recv().await {
                let mut d = data.write().await;
                d.connections = reconcile_connections(&snapshot);
            }
        });

        let mut tasks = self.tasks.lock().await;
        *tasks = vec![folders_task, connections_task];
        info!(%principal, "board subscriptions opened");
    }

    /// Close both subscriptions and clear local state. Pending writes are
    /// not cancelled; they complete against the store without local effect.
    pub async fn stop(&self) {
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
        let mut d = self.data.write().await;
        *d = BoardData::default();
    }

    // =========================================================================
    // FOLDER OPERATIONS
    // =========================================================================

    /// Create a folder with a generated id, a default name, a random
    /// position, and no items. Silent no-op without a principal.
    ///
    /// # Errors
    ///
    /// Returns a store error if the document write fails.
    pub async fn create_folder(&self) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };
        let count = self.data.read().await.folders.len();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: format!("New Folder {}", count + 1),
            position: Position::random_spawn(),
            items: Vec::new(),
            created_at: now_ms(),
        };
        info!(folder_id = %folder.id, name = %folder.name, "creating folder");
        self.docs
            .upsert_replace(&CollectionPath::folders(&principal), &folder.id.to_string(), folder.to_fields())
            .await?;
        Ok(())
    }

    /// Move a folder: clamp the position to the board bounds and merge only
    /// the `position` field.
    ///
    /// # Errors
    ///
    /// Returns a store error if the merge write fails.
    pub async fn move_folder(&self, folder_id: Uuid, position: Position) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };
        let clamped = position.clamped();
        let mut fields = Fields::new();
        fields.insert("position".into(), serde_json::to_value(clamped).unwrap_or_default());
        self.docs
            .upsert_merge(&CollectionPath::folders(&principal), &folder_id.to_string(), fields)
            .await?;
        Ok(())
    }

    /// Delete a folder and everything it owns: its blob-backed items' blobs,
    /// the folder document, and every connection touching the folder.
    ///
    /// The cascade is partial-failure tolerant — blob and connection
    /// deletions log and continue. Clears the selection if this folder was
    /// selected.
    ///
    /// # Errors
    ///
    /// Returns a store error only if the folder-document deletion fails.
    pub async fn delete_folder(&self, folder_id: Uuid) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };

        // Snapshot the cascade targets before any I/O.
        let (blob_ids, connection_ids) = {
            let d = self.data.read().await;
            let blob_ids: Vec<Uuid> = d
                .folders
                .iter()
                .find(|f| f.id == folder_id)
                .map(|f| f.items.iter().filter(|i| i.is_blob_backed()).map(Item::id).collect())
                .unwrap_or_default();
            let connection_ids: Vec<Uuid> = d
                .connections
                .iter()
                .filter(|c| c.source.references(folder_id) || c.target.references(folder_id))
                .map(|c| c.id)
                .collect();
            (blob_ids, connection_ids)
        };

        for blob_id in &blob_ids {
            let path = BlobPath::new(&principal, *blob_id);
            if let Err(e) = self.blobs.delete(&path).await {
                warn!(error = %e, %blob_id, "blob delete failed; continuing cascade");
            }
        }

        self.docs
            .delete(&CollectionPath::folders(&principal), &folder_id.to_string())
            .await?;

        let connections = CollectionPath::connections(&principal);
        for connection_id in &connection_ids {
            if let Err(e) = self.docs.delete(&connections, &connection_id.to_string()).await {
                warn!(error = %e, %connection_id, "connection delete failed; continuing cascade");
            }
        }

        let mut d = self.data.write().await;
        d.session.folder_deleted(folder_id);
        info!(%folder_id, blobs = blob_ids.len(), connections = connection_ids.len(), "folder deleted");
        Ok(())
    }

    // =========================================================================
    // ITEM OPERATIONS
    // =========================================================================

    /// Upload a file into the selected folder: store the blob, resolve its
    /// URL, classify the item by media type, and append it to the folder's
    /// item sequence. Silent no-op without a principal or selection. The
    /// loading flag is set for the duration and always cleared.
    ///
    /// # Errors
    ///
    /// Returns a store error if the upload or either write fails.
    pub async fn upload_item(&self, payload: UploadPayload) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };
        let Some(folder_id) = self.data.read().await.session.selected_folder else {
            return Ok(());
        };

        self.data.write().await.session.loading = true;
        let result = self.upload_item_inner(&principal, folder_id, payload).await;
        self.data.write().await.session.loading = false;
        result
    }

    async fn upload_item_inner(&self, principal: &str, folder_id: Uuid, payload: UploadPayload) -> Result<(), BoardError> {
        let item_id = Uuid::new_v4();
        let blob_path = BlobPath::new(principal, item_id);
        self.blobs.upload(&blob_path, payload.bytes).await?;
        let url = self.blobs.retrieval_url(&blob_path).await?;

        let item = Item::from_upload(item_id, payload.name, url, &payload.content_type, now_ms());
        info!(%item_id, %folder_id, kind = ?item.kind(), "item uploaded");
        self.append_item(principal, folder_id, item).await
    }

    /// Create a text note in the selected folder. Both fields must be
    /// non-empty after trimming; otherwise this is a local no-op with no
    /// remote call. Silent no-op without a principal or selection.
    ///
    /// # Errors
    ///
    /// Returns a store error if the items write fails.
    pub async fn create_text_item(&self, title: &str, content: &str) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };
        let Some(folder_id) = self.data.read().await.session.selected_folder else {
            return Ok(());
        };
        if title.trim().is_empty() || content.trim().is_empty() {
            debug!(%folder_id, "text note rejected: empty title or content");
            return Ok(());
        }

        let item = Item::Text {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now_ms(),
        };
        self.append_item(&principal, folder_id, item).await
    }

    /// Replace a folder's item sequence wholesale with the caller-provided
    /// order, after a local drag-and-drop move.
    ///
    /// # Errors
    ///
    /// Returns a store error if the items write fails.
    pub async fn reorder_items(&self, folder_id: Uuid, items: Vec<Item>) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };
        self.write_items(&principal, folder_id, &items).await
    }

    /// Delete an item. For blob-backed kinds, the blob deletion is attempted
    /// first; a failure there is logged and the document-level removal
    /// proceeds regardless. Closes the text viewer if it showed this item.
    ///
    /// # Errors
    ///
    /// Returns a store error if the items write fails.
    pub async fn delete_item(&self, folder_id: Uuid, item_id: Uuid, kind: ItemKind) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };

        if kind.is_blob_backed() {
            let path = BlobPath::new(&principal, item_id);
            if let Err(e) = self.blobs.delete(&path).await {
                warn!(error = %e, %item_id, "blob delete failed; removing item anyway");
            }
        }

        let items: Vec<Item> = {
            let d = self.data.read().await;
            let Some(folder) = d.folders.iter().find(|f| f.id == folder_id) else {
                return Ok(());
            };
            folder.items.iter().filter(|i| i.id() != item_id).cloned().collect()
        };
        self.write_items(&principal, folder_id, &items).await?;

        self.data.write().await.session.item_deleted(item_id);
        Ok(())
    }

    async fn append_item(&self, principal: &str, folder_id: Uuid, item: Item) -> Result<(), BoardError> {
        let items: Vec<Item> = {
            let d = self.data.read().await;
            let mut items = d
                .folders
                .iter()
                .find(|f| f.id == folder_id)
                .map(|f| f.items.clone())
                .unwrap_or_default();
            items.push(item);
            items
        };
        self.write_items(principal, folder_id, &items).await
    }

    async fn write_items(&self, principal: &str, folder_id: Uuid, items: &[Item]) -> Result<(), BoardError> {
        let mut fields = Fields::new();
        fields.insert("items".into(), serde_json::to_value(items).unwrap_or_default());
        self.docs
            .upsert_merge(&CollectionPath::folders(principal), &folder_id.to_string(), fields)
            .await?;
        Ok(())
    }

    // =========================================================================
    // CONNECTION OPERATIONS
    // =========================================================================

    /// Create a connection between two endpoints. Applies the default color
    /// (cyan) when none is given.
    ///
    /// # Errors
    ///
    /// Returns a store error if the document write fails.
    pub async fn create_connection(&self, source: Endpoint, target: Endpoint, color: Option<String>) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };
        let connection = Connection {
            id: Uuid::new_v4(),
            source,
            target,
            color: color.unwrap_or_else(|| DEFAULT_CONNECTION_COLOR.to_string()),
            created_at: now_ms(),
        };
        info!(connection_id = %connection.id, color = %connection.color, "creating connection");
        self.docs
            .upsert_replace(&CollectionPath::connections(&principal), &connection.id.to_string(), connection.to_fields())
            .await?;
        Ok(())
    }

    /// Delete a connection document.
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails.
    pub async fn delete_connection(&self, connection_id: Uuid) -> Result<(), BoardError> {
        let Some(principal) = self.principal() else {
            return Ok(());
        };
        self.docs
            .delete(&CollectionPath::connections(&principal), &connection_id.to_string())
            .await?;
        Ok(())
    }
}

// =============================================================================
// PRESENTATION INTENTS
// =============================================================================

/// Callback-style contract consumed by the presentation layer: one method
/// per user intent. Every remaining error is logged here; none propagate.
impl BoardManager {
    pub async fn on_folder_click(&self, folder_id: Uuid) {
        self.data.write().await.session.select_folder(folder_id);
    }

    /// One intermediate drag frame; the position is persisted immediately.
    pub async fn on_folder_drag(&self, folder_id: Uuid, position: Position) {
        if let Err(e) = self.move_folder(folder_id, position).await {
            error!(error = %e, %folder_id, "folder move failed");
        }
    }

    pub async fn on_folder_context_action(&self, folder_id: Uuid, action: FolderAction) {
        match action {
            FolderAction::Connect { color } => {
                let result = self
                    .create_connection(Endpoint::BoardCenter, Endpoint::Folder(folder_id), Some(color))
                    .await;
                if let Err(e) = result {
                    error!(error = %e, %folder_id, "connection create failed");
                }
            }
            FolderAction::Delete => {
                if let Err(e) = self.delete_folder(folder_id).await {
                    error!(error = %e, %folder_id, "folder delete failed");
                }
            }
        }
    }

    pub async fn on_create_folder(&self) {
        if let Err(e) = self.create_folder().await {
            error!(error = %e, "folder create failed");
        }
    }

    pub async fn on_upload_file(&self, payload: UploadPayload) {
        self.data.write().await.session.upload_modal_open = false;
        if let Err(e) = self.upload_item(payload).await {
            error!(error = %e, "file upload failed");
        }
    }

    pub async fn on_create_text_note(&self, title: &str, content: &str) {
        self.data.write().await.session.text_modal_open = false;
        if let Err(e) = self.create_text_item(title, content).await {
            error!(error = %e, "text note create failed");
        }
    }

    pub async fn on_reorder_items(&self, folder_id: Uuid, items: Vec<Item>) {
        if let Err(e) = self.reorder_items(folder_id, items).await {
            error!(error = %e, %folder_id, "item reorder failed");
        }
    }

    pub async fn on_delete_item(&self, folder_id: Uuid, item_id: Uuid, kind: ItemKind) {
        if let Err(e) = self.delete_item(folder_id, item_id, kind).await {
            error!(error = %e, %item_id, "item delete failed");
        }
    }

    pub async fn on_create_connection(&self, source: Endpoint, target: Endpoint, color: Option<String>) {
        if let Err(e) = self.create_connection(source, target, color).await {
            error!(error = %e, "connection create failed");
        }
    }

    pub async fn on_delete_connection(&self, connection_id: Uuid) {
        if let Err(e) = self.delete_connection(connection_id).await {
            error!(error = %e, %connection_id, "connection delete failed");
        }
    }

    pub async fn on_select_text_item(&self, item_id: Uuid) {
        self.data.write().await.session.view_text(item_id);
    }

    pub async fn on_close_viewer(&self) {
        self.data.write().await.session.close_viewer();
    }

    pub async fn on_open_upload_modal(&self) {
        self.data.write().await.session.upload_modal_open = true;
    }

    pub async fn on_close_upload_modal(&self) {
        self.data.write().await.session.upload_modal_open = false;
    }

    pub async fn on_open_text_modal(&self) {
        self.data.write().await.session.text_modal_open = true;
    }

    pub async fn on_close_text_modal(&self) {
        self.data.write().await.session.text_modal_open = false;
    }
}

// =============================================================================
// SESSION TASK
// =============================================================================

/// Watch identity transitions and open/close the board subscriptions on
/// sign-in / sign-out. Returns a handle for shutdown.
pub fn spawn_session_task(manager: Arc<BoardManager>) -> JoinHandle<()> {
    let mut auth = manager.identity.watch();
    tokio::spawn(async move {
        loop {
            let signed_in = auth.borrow_and_update().is_some();
            if signed_in {
                manager.start().await;
            } else {
                manager.stop().await;
            }
            if auth.changed().await.is_err() {
                break;
            }
        }
    })
}

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Replace the local folder collection with a decoded snapshot.
///
/// Pure: the only use of `current` is to keep the locally generated position
/// of a folder whose document still lacks one, so it doesn't jump on every
/// push. Malformed documents are logged and skipped.
#[must_use]
pub fn reconcile_folders(current: &[Folder], snapshot: &[Document]) -> Vec<Folder> {
    snapshot
        .iter()
        .filter_map(|doc| {
            let id = match Uuid::parse_str(&doc.id) {
                Ok(id) => id,
                Err(e) => {
                    warn!(error = %e, doc_id = %doc.id, "skipping folder with malformed id");
                    return None;
                }
            };
            let prior = current.iter().find(|f| f.id == id).map(|f| f.position);
            match Folder::decode(id, &doc.fields, prior) {
                Ok(folder) => Some(folder),
                Err(e) => {
                    warn!(error = %e, doc_id = %doc.id, "skipping malformed folder document");
                    None
                }
            }
        })
        .collect()
}

/// Replace the local connection collection with a decoded snapshot.
/// Malformed documents are logged and skipped.
#[must_use]
pub fn reconcile_connections(snapshot: &[Document]) -> Vec<Connection> {
    snapshot
        .iter()
        .filter_map(|doc| {
            let id = match Uuid::parse_str(&doc.id) {
                Ok(id) => id,
                Err(e) => {
                    warn!(error = %e, doc_id = %doc.id, "skipping connection with malformed id");
                    return None;
                }
            };
            match Connection::decode(id, &doc.fields) {
                Ok(connection) => Some(connection),
                Err(e) => {
                    warn!(error = %e, doc_id = %doc.id, "skipping malformed connection document");
                    None
                }
            }
        })
        .collect()
}
