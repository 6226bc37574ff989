//! HTTP request handlers for the graph server.
//!
//! Serves rendered graph artifacts as static files and reports which
//! documents have graphs available.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router as AxumRouter,
};
use ledgerlens_domain::DocumentId;
use ledgerlens_store::{ArtifactStore, LoadedRegistry, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Artifact storage the graphs are served from
    pub store: Arc<ArtifactStore>,
    /// Documents with a graph available
    pub registry: Arc<LoadedRegistry>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of documents with a loaded graph
    pub loaded_documents: usize,
}

/// One uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Uploaded file name
    pub file_name: String,
    /// Extension-stripped document identity
    pub document: String,
    /// Extracted text and graph both exist
    pub cached: bool,
    /// The graph is available for queries
    pub loaded: bool,
    /// Path of the graph under this server, when rendered
    pub graph_url: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Storage-related error
    StoreError(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::StoreError(e) => {
                error!(error = %e, "Storage error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreError(e)
    }
}

/// GET /documents - Uploaded documents and the state of their graphs
///
/// Graphs written by other processes since the last call are picked up
/// first.
async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentEntry>>, AppError> {
    state.registry.reconcile_from_disk(&state.store)?;

    let entries = state
        .store
        .list_uploads()?
        .into_iter()
        .filter_map(|file_name| {
            let id = DocumentId::from_filename(&file_name)?;
            let graph_url = state
                .store
                .has_graph(&id)
                .then(|| format!("/graphs/{}", id.graph_file_name()));

            Some(DocumentEntry {
                cached: state.store.has_cached_artifacts(&id),
                loaded: state.registry.is_loaded(&id),
                document: id.as_str().to_string(),
                graph_url,
                file_name,
            })
        })
        .collect();

    Ok(Json(entries))
}

/// GET /health - Liveness check
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        loaded_documents: state.registry.len(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    let graphs = ServeDir::new(state.store.graphs_dir());

    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/documents", get(list_documents))
        .nest_service("/graphs", graphs)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
