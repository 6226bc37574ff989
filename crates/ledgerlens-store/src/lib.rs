//! LedgerLens Storage Layer
//!
//! Filesystem persistence for uploaded filings and their derived artifacts,
//! the HTML graph renderer, and the in-memory Loaded Registry.
//!
//! # Architecture
//!
//! - One data directory with `uploads/`, `processed_texts/` and `graphs/`
//! - Every artifact is keyed by the document's extension-stripped file name
//! - Rendered graphs are standalone HTML pages served by `ledgerlens-server`
//!
//! # Examples
//!
//! ```no_run
//! use ledgerlens_domain::{DocumentId, KnowledgeGraph};
//! use ledgerlens_store::{ArtifactStore, LoadedRegistry};
//!
//! let store = ArtifactStore::open("./data")?;
//! let id = DocumentId::from_filename("ACME-2024.pdf").unwrap();
//! let path = store.render(&KnowledgeGraph::default(), &id)?;
//!
//! let registry = LoadedRegistry::new();
//! registry.mark_loaded(&id);
//! # Ok::<(), ledgerlens_store::StoreError>(())
//! ```

#![warn(missing_docs)]

mod artifacts;
mod error;
mod pdf;
mod registry;
mod render;

pub use artifacts::{
    ArtifactStore, DeleteOutcome, GRAPH_DIR, MAX_UPLOAD_BYTES, TEXT_DIR, UPLOAD_DIR,
};
pub use error::StoreError;
pub use pdf::{page_count, DocumentReader, PdfReader, PlainTextReader};
pub use registry::LoadedRegistry;
pub use render::{escape_html, GraphRenderer, RenderOptions, VIS_NETWORK_JS};
