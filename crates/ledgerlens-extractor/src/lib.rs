//! LedgerLens Extractor
//!
//! Turns a filing's text into a bounded knowledge graph.
//!
//! # Architecture
//!
//! ```text
//! full text → SectionExtractor → TextChunker → LlmGraphExtractor (per chunk) → merge → KnowledgeGraph
//! ```
//!
//! # Key Features
//!
//! - **Section extraction**: Business, Risk Factors and MD&A items, with a
//!   first-pages fallback when the filing has no standard headers
//! - **Sliding-window chunking**: fixed-size overlapping windows
//! - **Failure isolation**: a chunk whose extraction fails contributes nothing
//!   and the run continues
//! - **Bounded merge**: first-seen node types, one global relationship cap,
//!   pruning of unreferenced nodes
//!
//! # Example Usage
//!
//! ```no_run
//! use ledgerlens_extractor::{Extractor, LlmGraphExtractor, PipelineConfig};
//! use ledgerlens_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"nodes": [], "relationships": []}"#);
//! let extractor = Extractor::new(LlmGraphExtractor::new(llm), PipelineConfig::default())?;
//!
//! let result = extractor.build_graph(&"Acme Corp sells widgets. ".repeat(100)).await?;
//! println!("{} nodes, {} relationships", result.graph.node_count(), result.graph.relationship_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod merger;
mod parser;
mod prompt;
mod sections;
mod types;


pub use chunking::{Chunks, TextChunker};
pub use config::PipelineConfig;
pub use error::ExtractorError;
pub use extractor::{Extractor, LlmGraphExtractor};
pub use merger::merge;
pub use parser::parse_graph_response;
pub use prompt::{PromptBuilder, GRAPH_SCHEMA};
pub use sections::{ensure_min_length, SectionExtraction, SectionExtractor, SourceText};
pub use types::{ExtractionMetadata, ExtractionResult};
