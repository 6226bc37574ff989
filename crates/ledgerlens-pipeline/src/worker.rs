//! Background generation worker
//!
//! One worker runs per processing request. It owns the progress sender and
//! always finishes the run with exactly one terminal message, including
//! when the generation task panics.

use crate::error::PipelineError;
use crate::progress::{ProgressSender, StageSender};
use ledgerlens_domain::{DocumentId, GraphExtractor};
use ledgerlens_extractor::{
    ensure_min_length, Extractor, ExtractorError, SectionExtractor, SourceText,
};
use ledgerlens_store::{ArtifactStore, DocumentReader, LoadedRegistry, StoreError};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub(crate) const STAGE_ANALYZING: &str = "Analyzing document structure...";
pub(crate) const STAGE_GENERATING: &str = "Generating knowledge graph from key sections...";
pub(crate) const STAGE_PREPARING: &str = "Preparing graph for analysis...";

const UNREADABLE_MESSAGE: &str = "PDF file can't be processed. Please check if the text is \
                                  selectable and that it's a correctly formatted 10-K file.";

/// Documents with a generation run in flight
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    documents: Arc<Mutex<HashSet<DocumentId>>>,
}

impl InFlight {
    /// Claim `id`; `None` when another run already holds it
    pub(crate) fn claim(&self, id: &DocumentId) -> Option<Claim> {
        let mut documents = self
            .documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if documents.insert(id.clone()) {
            Some(Claim {
                documents: Arc::clone(&self.documents),
                id: id.clone(),
            })
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, id: &DocumentId) -> bool {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Held for the life of a run; releases the document on drop
#[derive(Debug)]
pub(crate) struct Claim {
    documents: Arc<Mutex<HashSet<DocumentId>>>,
    id: DocumentId,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Everything a single generation run needs
pub(crate) struct GenerationTask<E> {
    pub(crate) store: Arc<ArtifactStore>,
    pub(crate) registry: Arc<LoadedRegistry>,
    pub(crate) reader: Arc<dyn DocumentReader>,
    pub(crate) sections: Arc<SectionExtractor>,
    pub(crate) extractor: Arc<Extractor<E>>,
    pub(crate) file_name: String,
    pub(crate) document: DocumentId,
}

impl<E> GenerationTask<E>
where
    E: GraphExtractor + Send + Sync + 'static,
    E::Error: Into<ExtractorError> + Send + 'static,
{
    /// Run in the background, reporting through `progress`
    pub(crate) fn spawn(self, progress: ProgressSender, claim: Claim) -> JoinHandle<()> {
        tokio::spawn(async move {
            let file_name = self.file_name.clone();
            let document = self.document.clone();

            let stages = progress.stages();
            let outcome = tokio::spawn(self.generate(stages)).await;

            // Idle again before the caller sees the terminal message
            drop(claim);

            match outcome {
                Ok(Ok(artifact)) => {
                    info!(
                        document = %document,
                        artifact = %artifact.display(),
                        "Generation complete"
                    );
                    progress.complete(
                        artifact,
                        format!("Successfully processed {}.", file_name),
                        document,
                    );
                }
                Ok(Err(e)) => {
                    error!(document = %document, error = %e, "Generation failed");
                    progress.error(e.user_message());
                }
                Err(e) => {
                    error!(document = %document, error = %e, "Generation task aborted");
                    progress.error(format!("An unexpected error occurred: {}", e));
                }
            }
        })
    }

    async fn generate(self, stages: StageSender) -> Result<PathBuf, PipelineError> {
        stages.progress(0.1, STAGE_ANALYZING);

        let path = self
            .store
            .upload_path(&self.file_name)
            .ok_or_else(|| PipelineError::NotFound(self.file_name.clone()))?;

        let reader = Arc::clone(&self.reader);
        let text = tokio::task::spawn_blocking(move || reader.read_text(&path))
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))?
            .map_err(|e| match e {
                StoreError::Extraction(reason) => {
                    warn!(file = %self.file_name, reason = %reason, "Could not read document text");
                    PipelineError::Validation(UNREADABLE_MESSAGE.to_string())
                }
                other => PipelineError::Store(other),
            })?;

        let extraction = self.sections.extract(&SourceText::from_text(&text))?;
        ensure_min_length(&extraction.content, self.extractor.config().min_text_length)?;
        self.store.write_text(&self.document, &extraction.content)?;

        info!(
            document = %self.document,
            chars = extraction.content.len(),
            used_fallback = extraction.used_fallback,
            "Extracted key sections"
        );

        stages.progress(0.4, STAGE_GENERATING);
        let result = self
            .extractor
            .build_graph_with_progress(&extraction.content, |index, total| {
                let fraction = 0.4 + 0.5 * index as f32 / total.max(1) as f32;
                stages.progress(fraction, format!("Processing chunk {}/{}", index + 1, total));
            })
            .await?;

        if !result.metadata.failed_chunks.is_empty() {
            warn!(
                document = %self.document,
                failed = result.metadata.failed_chunks.len(),
                total = result.metadata.chunk_count,
                "Some chunks produced no graph"
            );
        }

        let artifact = self.store.render(&result.graph, &self.document)?;

        stages.progress(0.9, STAGE_PREPARING);
        self.registry.mark_loaded(&self.document);

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> DocumentId {
        DocumentId::from_filename(name).unwrap()
    }

    #[test]
    fn test_claim_is_exclusive_until_dropped() {
        let in_flight = InFlight::default();

        let claim = in_flight.claim(&id("ACME.pdf")).unwrap();
        assert!(in_flight.claim(&id("ACME.pdf")).is_none());
        assert!(in_flight.claim(&id("BETA.pdf")).is_some());
        assert!(in_flight.contains(&id("ACME")));

        drop(claim);
        assert!(!in_flight.contains(&id("ACME")));
        assert!(in_flight.claim(&id("ACME.pdf")).is_some());
    }
}
