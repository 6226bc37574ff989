//! LedgerLens Graph Server
//!
//! Serves the rendered knowledge-graph pages under `/graphs/` so the
//! visualization snippet can embed them, and lists uploaded documents with
//! the state of their graphs.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use ledgerlens_store::{ArtifactStore, LoadedRegistry, StoreError};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Data directory could not be opened
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application state for a data directory.
///
/// Documents processed before this process started are marked loaded.
pub fn open_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let store = Arc::new(ArtifactStore::open(&config.data_dir)?);
    let registry = Arc::new(LoadedRegistry::new());
    registry.reconcile_from_disk(&store)?;

    Ok(AppState { store, registry })
}

/// Start the graph server and run until it fails
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting LedgerLens graph server");
    info!("Data directory: {}", config.data_dir.display());

    let state = open_state(&config)?;
    info!("Loaded graphs: {}", state.registry.len());

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Graph server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
