//! Server wiring shared by the binary and the integration tests.

use crate::commands::Router;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::{snapshot, SnapshotError, Store};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Builds the store for startup.
///
/// With a snapshot path, the store starts from the file's contents (empty if
/// the file does not exist). A corrupt file is returned as an error so the
/// caller can refuse to start.
pub async fn open_store(snapshot_path: Option<&Path>) -> Result<Store, SnapshotError> {
    let Some(path) = snapshot_path else {
        return Ok(Store::new());
    };

    let data = snapshot::load(path).await?;
    info!(path = %path.display(), keys = data.len(), "Snapshot loaded");
    Ok(Store::from_map(data))
}

/// Main loop that accepts incoming connections
pub async fn accept_loop(listener: TcpListener, router: Router, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let router = router.clone();
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, router, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
