//! Demo session against the in-memory backend: sign in, build a small
//! board, and print what the snapshot stream reconciled.

use std::sync::Arc;
use std::time::Duration;

use visionboard::board::{BoardManager, FolderAction, UploadPayload, spawn_session_task};
use visionboard::consts::CONNECTION_PALETTE;
use visionboard::store::memory::{MemoryBlobStore, MemoryDocumentStore, MemoryIdentity};

/// Give the snapshot push and the reconcile task a moment to run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let identity = Arc::new(MemoryIdentity::new());
    let docs = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());

    let manager = Arc::new(BoardManager::new(identity.clone(), docs, blobs));
    let session = spawn_session_task(Arc::clone(&manager));

    identity.sign_in("demo-user");
    settle().await;

    manager.on_create_folder().await;
    settle().await;

    let folder_id = manager.data().read().await.folders.first().map(|f| f.id);
    if let Some(folder_id) = folder_id {
        manager.on_folder_click(folder_id).await;
        manager
            .on_upload_file(UploadPayload {
                name: "sunset.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            })
            .await;
        manager.on_create_text_note("2026 goals", "Ship the board.").await;
        manager
            .on_folder_context_action(folder_id, FolderAction::Connect { color: CONNECTION_PALETTE[1].to_string() })
            .await;
    }
    settle().await;

    {
        let d = manager.data().read().await;
        let items = d.folders.first().map_or(0, |f| f.items.len());
        tracing::info!(folders = d.folders.len(), items, connections = d.connections.len(), "demo board state");
    }

    identity.sign_out();
    settle().await;
    session.abort();
}
