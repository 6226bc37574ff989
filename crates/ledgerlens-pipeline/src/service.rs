//! Document lifecycle: upload, process, view, delete

use crate::error::PipelineError;
use crate::progress::{progress_channel, ProgressReceiver};
use crate::worker::{GenerationTask, InFlight};
use ledgerlens_domain::{DocumentId, GraphExtractor};
use ledgerlens_extractor::{Extractor, ExtractorError, PipelineConfig, SectionExtractor};
use ledgerlens_store::{
    escape_html, ArtifactStore, DeleteOutcome, DocumentReader, LoadedRegistry, PdfReader,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the graph server is reachable by default
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:7861";

const SELECT_DOCUMENT_MESSAGE: &str = "Please select a document.";
const NO_FILE_SELECTED_MESSAGE: &str = "No file selected.";
const SELECT_GRAPH_HTML: &str =
    "<h3>Select a processed document to view its knowledge graph.</h3>";

/// One uploaded document and the state of its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    /// Uploaded file name
    pub file_name: String,
    /// Derived document identity
    pub document: DocumentId,
    /// Extracted text and graph both exist on disk
    pub cached: bool,
    /// The graph is available for queries
    pub loaded: bool,
    /// A generation run is in flight
    pub processing: bool,
}

/// Coordinates storage, the Loaded Registry and generation workers
pub struct DocumentService<E> {
    store: Arc<ArtifactStore>,
    registry: Arc<LoadedRegistry>,
    reader: Arc<dyn DocumentReader>,
    sections: Arc<SectionExtractor>,
    extractor: Arc<Extractor<E>>,
    in_flight: InFlight,
    public_url: String,
}

impl<E> Clone for DocumentService<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            reader: Arc::clone(&self.reader),
            sections: Arc::clone(&self.sections),
            extractor: Arc::clone(&self.extractor),
            in_flight: self.in_flight.clone(),
            public_url: self.public_url.clone(),
        }
    }
}

impl<E> DocumentService<E>
where
    E: GraphExtractor + Send + Sync + 'static,
    E::Error: Into<ExtractorError> + Send + 'static,
{
    /// Create a service; fails when `config` is invalid
    pub fn new(
        store: Arc<ArtifactStore>,
        registry: Arc<LoadedRegistry>,
        extractor: E,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let sections = SectionExtractor::new(&config)?;
        let extractor = Extractor::new(extractor, config)?;

        Ok(Self {
            store,
            registry,
            reader: Arc::new(PdfReader),
            sections: Arc::new(sections),
            extractor: Arc::new(extractor),
            in_flight: InFlight::default(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
        })
    }

    /// Read uploads with a different reader
    pub fn with_reader(mut self, reader: impl DocumentReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    /// Base URL under which the graph server serves `/graphs/`
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Artifact storage
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Loaded Registry
    pub fn registry(&self) -> &LoadedRegistry {
        &self.registry
    }

    /// Store an uploaded filing; returns its stored file name
    pub fn upload(&self, source: &Path) -> Result<String, PipelineError> {
        Ok(self.store.save_upload(source)?)
    }

    /// Every upload with its cached/loaded state
    pub fn list_documents(&self) -> Result<Vec<DocumentSummary>, PipelineError> {
        let uploads = self.store.list_uploads()?;

        Ok(uploads
            .into_iter()
            .filter_map(|file_name| {
                let document = DocumentId::from_filename(&file_name)?;
                Some(DocumentSummary {
                    cached: self.store.has_cached_artifacts(&document),
                    loaded: self.registry.is_loaded(&document),
                    processing: self.in_flight.contains(&document),
                    file_name,
                    document,
                })
            })
            .collect())
    }

    /// Start processing an uploaded document.
    ///
    /// Returns immediately; the run reports through the receiver and always
    /// ends with one terminal message. A document whose text and graph are
    /// already cached completes at once without calling the model. Must be
    /// called from within a Tokio runtime.
    pub fn process(&self, file_name: Option<&str>) -> ProgressReceiver {
        let (progress, receiver) = progress_channel();

        let Some((file_name, document)) = selection(file_name) else {
            progress.error(SELECT_DOCUMENT_MESSAGE);
            return receiver;
        };

        if self.store.has_cached_artifacts(&document) {
            info!(document = %document, "Using cached artifacts");
            self.registry.mark_loaded(&document);
            progress.complete(
                self.store.graph_path(&document),
                format!("Loaded cached results for {}.", file_name),
                document,
            );
            return receiver;
        }

        let Some(claim) = self.in_flight.claim(&document) else {
            warn!(document = %document, "Processing already in progress");
            progress.error(format!("{} is already being processed.", file_name));
            return receiver;
        };

        debug!(document = %document, "Starting generation worker");
        let task = GenerationTask {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            reader: Arc::clone(&self.reader),
            sections: Arc::clone(&self.sections),
            extractor: Arc::clone(&self.extractor),
            file_name: file_name.to_string(),
            document,
        };
        task.spawn(progress, claim);

        receiver
    }

    /// Remove a document's upload, text and graph; returns a status line.
    ///
    /// A document with a generation run in flight is left untouched. The
    /// claim is held for the whole deletion so no run can start meanwhile.
    pub fn delete(&self, file_name: Option<&str>) -> String {
        let Some((file_name, document)) = selection(file_name) else {
            return NO_FILE_SELECTED_MESSAGE.to_string();
        };

        let Some(_claim) = self.in_flight.claim(&document) else {
            warn!(document = %document, "Delete refused while processing");
            return format!(
                "{} is being processed; try again when it finishes.",
                file_name
            );
        };

        match self.store.delete(file_name) {
            Ok(DeleteOutcome::Deleted(_)) => {
                self.registry.unload(&document);
                format!(
                    "Successfully deleted '{}' and its associated cache files.",
                    file_name
                )
            }
            Ok(DeleteOutcome::NothingFound) => {
                self.registry.unload(&document);
                format!("No files found to delete for '{}'.", file_name)
            }
            Err(e) => e.to_string(),
        }
    }

    /// URL of a document's rendered graph
    pub fn graph_url(&self, document: &DocumentId) -> String {
        format!("{}/graphs/{}", self.public_url, document.graph_file_name())
    }

    /// Path of a document's rendered graph, when it exists
    pub fn graph_artifact(&self, file_name: &str) -> Option<PathBuf> {
        let document = DocumentId::from_filename(file_name)?;
        self.store
            .has_graph(&document)
            .then(|| self.store.graph_path(&document))
    }

    /// HTML fragment embedding the document's graph viewer
    pub fn load_visualization(&self, file_name: Option<&str>) -> String {
        let Some((file_name, document)) = selection(file_name) else {
            return SELECT_GRAPH_HTML.to_string();
        };

        if !self.store.has_graph(&document) {
            return format!(
                "<h3>Graph not found for '{}'.</h3><p>Please process the document first.</p>",
                escape_html(file_name)
            );
        }

        format!(
            r#"<iframe src="{}" width="100%" height="100%"></iframe>"#,
            escape_html(&self.graph_url(&document))
        )
    }
}

fn selection(file_name: Option<&str>) -> Option<(&str, DocumentId)> {
    let file_name = file_name.map(str::trim).filter(|f| !f.is_empty())?;
    let document = DocumentId::from_filename(file_name)?;
    Some((file_name, document))
}
