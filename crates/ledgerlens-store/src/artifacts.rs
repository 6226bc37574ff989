//! Filesystem layout for uploads and derived artifacts
//!
//! ```text
//! <root>/uploads/<id>.<ext>           raw upload, original extension
//! <root>/processed_texts/<id>.txt     extracted section text
//! <root>/graphs/<id>.html             rendered graph
//! ```

use crate::error::StoreError;
use crate::render::GraphRenderer;
use ledgerlens_domain::{DocumentId, KnowledgeGraph};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory holding raw uploads
pub const UPLOAD_DIR: &str = "uploads";

/// Directory holding extracted section text
pub const TEXT_DIR: &str = "processed_texts";

/// Directory holding rendered graphs
pub const GRAPH_DIR: &str = "graphs";

/// Largest accepted upload (200 MB)
pub const MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// What a deletion removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// At least one artifact was removed; file names in removal order
    Deleted(Vec<String>),
    /// None of the document's artifacts existed
    NothingFound,
}

/// Per-document artifact storage rooted at one data directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    renderer: GraphRenderer,
}

impl ArtifactStore {
    /// Open a store at `root`, creating its directories if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            root: root.into(),
            renderer: GraphRenderer::default(),
        };
        for dir in [store.uploads_dir(), store.texts_dir(), store.graphs_dir()] {
            fs::create_dir_all(&dir)?;
        }
        debug!(root = %store.root.display(), "Opened artifact store");
        Ok(store)
    }

    /// Use a custom graph renderer
    pub fn with_renderer(mut self, renderer: GraphRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding raw uploads
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOAD_DIR)
    }

    /// Directory holding extracted section text
    pub fn texts_dir(&self) -> PathBuf {
        self.root.join(TEXT_DIR)
    }

    /// Directory holding rendered graphs
    pub fn graphs_dir(&self) -> PathBuf {
        self.root.join(GRAPH_DIR)
    }

    /// Copy a file into the uploads directory under its base file name.
    ///
    /// Returns the stored file name. An existing upload with the same name
    /// is replaced.
    pub fn save_upload(&self, source: &Path) -> Result<String, StoreError> {
        let metadata = fs::metadata(source)
            .map_err(|_| StoreError::NotFound(source.display().to_string()))?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(source.display().to_string()));
        }
        if metadata.len() > MAX_UPLOAD_BYTES {
            return Err(StoreError::TooLarge {
                size: metadata.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| DocumentId::from_filename(n).is_some())
            .ok_or_else(|| StoreError::InvalidFileName(source.display().to_string()))?
            .to_string();

        fs::copy(source, self.uploads_dir().join(&file_name))?;
        info!(file = %file_name, "Saved upload");
        Ok(file_name)
    }

    /// Uploaded file names: regular files only, hidden files excluded, sorted
    pub fn list_uploads(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.uploads_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Path of an uploaded file, if it exists
    pub fn upload_path(&self, file_name: &str) -> Option<PathBuf> {
        let base = Path::new(file_name).file_name()?;
        let path = self.uploads_dir().join(base);
        path.is_file().then_some(path)
    }

    /// Uploads that belong to `id`
    fn uploads_for(&self, id: &DocumentId) -> Result<Vec<PathBuf>, StoreError> {
        let uploads = self.uploads_dir();
        Ok(self
            .list_uploads()?
            .into_iter()
            .filter(|name| DocumentId::from_filename(name).as_ref() == Some(id))
            .map(|name| uploads.join(name))
            .collect())
    }

    /// Path of the extracted text artifact (whether or not it exists)
    pub fn text_path(&self, id: &DocumentId) -> PathBuf {
        self.texts_dir().join(id.text_file_name())
    }

    /// Path of the rendered graph artifact (whether or not it exists)
    pub fn graph_path(&self, id: &DocumentId) -> PathBuf {
        self.graphs_dir().join(id.graph_file_name())
    }

    /// True when a rendered graph exists
    pub fn has_graph(&self, id: &DocumentId) -> bool {
        self.graph_path(id).is_file()
    }

    /// True when both the text and graph artifacts exist
    pub fn has_cached_artifacts(&self, id: &DocumentId) -> bool {
        self.text_path(id).is_file() && self.has_graph(id)
    }

    /// Persist extracted section text, replacing any previous version
    pub fn write_text(&self, id: &DocumentId, content: &str) -> Result<PathBuf, StoreError> {
        let path = self.text_path(id);
        write_replacing(&path, content)?;
        debug!(document = %id, path = %path.display(), "Wrote extracted text");
        Ok(path)
    }

    /// Read previously extracted section text
    pub fn read_text(&self, id: &DocumentId) -> Result<String, StoreError> {
        Ok(fs::read_to_string(self.text_path(id))?)
    }

    /// Render `graph` to the document's graph artifact and return its path
    pub fn render(&self, graph: &KnowledgeGraph, id: &DocumentId) -> Result<PathBuf, StoreError> {
        let html = self.renderer.render(graph, id.as_str())?;
        let path = self.graph_path(id);
        write_replacing(&path, &html)?;
        info!(
            document = %id,
            nodes = graph.node_count(),
            relationships = graph.relationship_count(),
            path = %path.display(),
            "Graph visualization saved"
        );
        Ok(path)
    }

    /// Documents whose text and graph artifacts both exist, sorted
    pub fn cached_documents(&self) -> Result<Vec<DocumentId>, StoreError> {
        let dir = self.graphs_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(id) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(DocumentId::from_filename)
            else {
                continue;
            };
            if self.has_cached_artifacts(&id) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Delete a document's upload, extracted text and graph.
    ///
    /// Every upload whose document id matches is removed, whatever its
    /// extension. Missing artifacts are skipped. The first removal that
    /// fails stops the deletion and names the artifact in the error.
    pub fn delete(&self, file_name: &str) -> Result<DeleteOutcome, StoreError> {
        let id = DocumentId::from_filename(file_name)
            .ok_or_else(|| StoreError::InvalidFileName(file_name.to_string()))?;

        let mut targets = self.uploads_for(&id)?;
        targets.push(self.text_path(&id));
        targets.push(self.graph_path(&id));

        let mut deleted = Vec::new();
        for path in &targets {
            let artifact = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match fs::remove_file(path) {
                Ok(()) => deleted.push(artifact),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    warn!(path = %path.display(), error = %source, "Error deleting file");
                    return Err(StoreError::Delete { artifact, source });
                }
            }
        }

        if deleted.is_empty() {
            Ok(DeleteOutcome::NothingFound)
        } else {
            info!(document = %id, files = ?deleted, "Deleted document artifacts");
            Ok(DeleteOutcome::Deleted(deleted))
        }
    }
}

/// Write through a sibling temp file so readers never see a partial artifact
fn write_replacing(path: &Path, content: &str) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
