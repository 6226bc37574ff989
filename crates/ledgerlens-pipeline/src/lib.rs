//! LedgerLens Processing Pipeline
//!
//! Runs document-to-graph generation on background workers and answers
//! questions about processed filings.
//!
//! # Architecture
//!
//! - [`DocumentService`] owns the document lifecycle: upload, process (with
//!   caching and a per-document claim), visualize and delete
//! - Each processing request gets its own worker; the caller reads a
//!   [`ProgressReceiver`] that ends with exactly one terminal message
//! - [`QueryService`] answers questions, gated on the Loaded Registry
//!
//! # Examples
//!
//! ```no_run
//! use ledgerlens_extractor::{LlmGraphExtractor, PipelineConfig};
//! use ledgerlens_llm::MockProvider;
//! use ledgerlens_pipeline::{DocumentService, ProgressMessage};
//! use ledgerlens_store::{ArtifactStore, LoadedRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ArtifactStore::open("./data")?);
//! let registry = Arc::new(LoadedRegistry::new());
//! let extractor = LlmGraphExtractor::new(MockProvider::new("{}"));
//!
//! let service = DocumentService::new(store, registry, extractor, PipelineConfig::default())?;
//! let mut progress = service.process(Some("ACME-2024.pdf"));
//!
//! let terminal = progress
//!     .wait_for_terminal(|fraction, text| println!("{:>3.0}% {}", fraction * 100.0, text))
//!     .await;
//! if let Some(ProgressMessage::Complete { artifact_path, .. }) = terminal {
//!     println!("Graph written to {}", artifact_path.display());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod progress;
mod query;
mod service;
mod worker;

pub use error::PipelineError;
pub use progress::{
    progress_channel, PollResult, ProgressMessage, ProgressReceiver, ProgressSender, StageSender,
    POLL_INTERVAL, PROGRESS_CAPACITY,
};
pub use query::{ChatTurn, QueryService, NOT_LOADED_MESSAGE, ORACLE_FAILURE_MESSAGE};
pub use service::{DocumentService, DocumentSummary, DEFAULT_PUBLIC_URL};
