//! LedgerLens Domain Layer
//!
//! Core model for turning long financial filings into knowledge graphs.
//! This crate has no external dependencies and defines the value types and
//! trait interfaces that the rest of the workspace builds on.
//!
//! ## Key Concepts
//!
//! - **Document**: an uploaded filing, identified by its extension-stripped base filename
//! - **Node**: a typed entity (`Company`, `Risk Factor`, ...) identified by name
//! - **Relationship**: a typed, directed edge between two node ids
//! - **Graph document**: the nodes and relationships extracted from one chunk
//! - **Knowledge graph**: the merged, capped and pruned result for a whole document
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Oracles (extraction, question answering) are modelled as traits
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod graph;
pub mod traits;

// Re-exports for convenience
pub use document::DocumentId;
pub use graph::{GraphDocument, KnowledgeGraph, Node, Relationship, UNKNOWN_NODE_TYPE};
pub use traits::{GraphExtractor, LlmProvider};
