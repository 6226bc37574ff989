//! Result types for graph extraction

use ledgerlens_domain::KnowledgeGraph;
use serde::{Deserialize, Serialize};

/// Result of building a knowledge graph from one document's text
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The merged, capped and pruned graph
    pub graph: KnowledgeGraph,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Number of chunks the text was split into
    pub chunk_count: usize,

    /// Zero-based indices of chunks whose extraction failed
    pub failed_chunks: Vec<usize>,

    /// Relationships extracted before the cap was applied
    pub raw_relationships: usize,

    /// Wall-clock time of the run (milliseconds)
    pub processing_time_ms: u64,
}

impl ExtractionMetadata {
    /// Number of chunks that contributed a result
    pub fn succeeded_chunks(&self) -> usize {
        self.chunk_count - self.failed_chunks.len()
    }
}
