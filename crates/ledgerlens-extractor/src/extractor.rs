//! Per-chunk extraction and the chunk-then-merge driver

use crate::chunking::TextChunker;
use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::merger::merge;
use crate::parser::parse_graph_response;
use crate::prompt::{PromptBuilder, GRAPH_SCHEMA};
use crate::sections::ensure_min_length;
use crate::types::{ExtractionMetadata, ExtractionResult};
use ledgerlens_domain::traits::{GraphExtractor, LlmProvider};
use ledgerlens_domain::GraphDocument;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Graph extractor backed by a language model
pub struct LlmGraphExtractor<L> {
    llm: L,
    document: Option<String>,
}

impl<L> LlmGraphExtractor<L> {
    /// Create an extractor over `llm`
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            document: None,
        }
    }

    /// Name the filing in every prompt
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }
}

impl<L> GraphExtractor for LlmGraphExtractor<L>
where
    L: LlmProvider,
    L::Error: std::fmt::Display,
{
    type Error = ExtractorError;

    fn extract_one(&self, chunk: &str) -> Result<GraphDocument, Self::Error> {
        let mut builder = PromptBuilder::new(chunk);
        if let Some(document) = &self.document {
            builder = builder.with_document(document);
        }
        let prompt = builder.build();

        debug!("Prompt length: {} chars", prompt.len());

        let response = self
            .llm
            .generate_structured(&prompt, GRAPH_SCHEMA)
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        debug!("LLM response length: {} chars", response.len());

        parse_graph_response(&response)
    }
}

/// Builds a document's knowledge graph: chunk, extract each chunk, merge
pub struct Extractor<E> {
    extractor: Arc<E>,
    chunker: TextChunker,
    config: PipelineConfig,
}

impl<E> Extractor<E>
where
    E: GraphExtractor + Send + Sync + 'static,
    E::Error: Into<ExtractorError> + Send + 'static,
{
    /// Create a new Extractor; fails when `config` is invalid
    pub fn new(extractor: E, config: PipelineConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let chunker = TextChunker::new(config.window_size, config.overlap)?;

        Ok(Self {
            extractor: Arc::new(extractor),
            chunker,
            config,
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the knowledge graph for `content`
    pub async fn build_graph(&self, content: &str) -> Result<ExtractionResult, ExtractorError> {
        self.build_graph_with_progress(content, |_, _| {}).await
    }

    /// Build the knowledge graph for `content`, reporting each chunk.
    ///
    /// `on_chunk(index, total)` is called before chunk `index` is submitted.
    /// A failing chunk is logged and contributes nothing; the run itself
    /// only fails when `content` is too short to process.
    pub async fn build_graph_with_progress<F>(
        &self,
        content: &str,
        mut on_chunk: F,
    ) -> Result<ExtractionResult, ExtractorError>
    where
        F: FnMut(usize, usize),
    {
        ensure_min_length(content, self.config.min_text_length)?;

        let start_time = Instant::now();
        let chunks = self.chunker.split(content);
        let total = chunks.len();

        info!(chunks = total, "Processing chunks for the knowledge graph");

        let mut per_chunk = Vec::with_capacity(total);
        let mut failed_chunks = Vec::new();

        for (index, chunk) in chunks.into_iter().enumerate() {
            on_chunk(index, total);
            debug!(chunk = index + 1, total, "Processing chunk");

            match self.extract_chunk(chunk).await {
                Ok(doc) => per_chunk.push(doc),
                Err(e) => {
                    warn!(chunk = index + 1, total, error = %e, "Could not process chunk");
                    failed_chunks.push(index);
                    per_chunk.push(GraphDocument::empty());
                }
            }
        }

        let raw_relationships = per_chunk.iter().map(|d| d.relationships.len()).sum();
        let graph = merge(&per_chunk, self.config.relationship_cap);

        let metadata = ExtractionMetadata {
            chunk_count: total,
            failed_chunks,
            raw_relationships,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            nodes = graph.node_count(),
            relationships = graph.relationship_count(),
            failed = metadata.failed_chunks.len(),
            "All chunks processed"
        );

        Ok(ExtractionResult { graph, metadata })
    }

    /// Run one chunk on the blocking pool, bounded by the extraction timeout
    async fn extract_chunk(&self, chunk: String) -> Result<GraphDocument, ExtractorError> {
        let extractor = Arc::clone(&self.extractor);

        let task = tokio::task::spawn_blocking(move || -> Result<GraphDocument, ExtractorError> {
            extractor.extract_one(&chunk).map_err(Into::into)
        });

        timeout(self.config.extraction_timeout(), task)
            .await
            .map_err(|_| ExtractorError::Timeout)?
            .map_err(|e| ExtractorError::Task(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_llm::MockProvider;

    const ACME_GRAPH: &str = r#"{
        "nodes": [{"id": "Acme", "type": "Company"}, {"id": "Cloud", "type": "Business Segment"}],
        "relationships": [{"source": "Acme", "target": "Cloud", "type": "HAS_SEGMENT"}]
    }"#;

    fn long_text() -> String {
        "Acme Corp operates a cloud segment. ".repeat(300)
    }

    #[test]
    fn test_llm_extractor_parses_response() {
        let extractor = LlmGraphExtractor::new(MockProvider::new(ACME_GRAPH));
        let doc = extractor.extract_one("Acme has a cloud segment").unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.relationships.len(), 1);
    }

    #[test]
    fn test_llm_extractor_names_document() {
        let llm = MockProvider::new(ACME_GRAPH);
        let extractor = LlmGraphExtractor::new(llm.clone()).with_document("acme-10k");
        extractor.extract_one("chunk").unwrap();
        assert!(llm.prompts()[0].contains("Filing: acme-10k"));
    }

    #[test]
    fn test_llm_extractor_maps_llm_error() {
        let mut llm = MockProvider::new(ACME_GRAPH);
        llm.add_error_containing("broken");
        let extractor = LlmGraphExtractor::new(llm);
        assert!(matches!(
            extractor.extract_one("a broken chunk"),
            Err(ExtractorError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn test_build_graph_calls_llm_once_per_chunk() {
        let llm = MockProvider::new(ACME_GRAPH);
        let extractor =
            Extractor::new(LlmGraphExtractor::new(llm.clone()), PipelineConfig::default()).unwrap();

        let text = long_text();
        let expected = TextChunker::new(4096, 256).unwrap().split(&text).len();
        let result = extractor.build_graph(&text).await.unwrap();

        assert_eq!(llm.call_count(), expected);
        assert_eq!(result.metadata.chunk_count, expected);
        assert_eq!(result.metadata.raw_relationships, expected);
        assert_eq!(result.graph.node_count(), 2);
    }

    #[tokio::test]
    async fn test_short_text_rejected_without_llm_calls() {
        let llm = MockProvider::new(ACME_GRAPH);
        let extractor =
            Extractor::new(LlmGraphExtractor::new(llm.clone()), PipelineConfig::default()).unwrap();

        let result = extractor.build_graph("too short").await;

        assert!(matches!(result, Err(ExtractorError::InsufficientText { .. })));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_reports_every_chunk() {
        let extractor = Extractor::new(
            LlmGraphExtractor::new(MockProvider::new(ACME_GRAPH)),
            PipelineConfig::default(),
        )
        .unwrap();

        let mut seen = Vec::new();
        let result = extractor
            .build_graph_with_progress(&long_text(), |i, n| seen.push((i, n)))
            .await
            .unwrap();

        let total = result.metadata.chunk_count;
        assert_eq!(seen, (0..total).map(|i| (i, total)).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            overlap: 5000,
            ..PipelineConfig::default()
        };
        let result = Extractor::new(LlmGraphExtractor::new(MockProvider::default()), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }
}
