//! Loaded Registry: which documents have a graph available for querying
//!
//! Process-lifetime state. A graph artifact can exist on disk while the
//! registry has no entry for it (after a restart); call
//! [`LoadedRegistry::reconcile_from_disk`] to mark such documents again.

use crate::artifacts::ArtifactStore;
use crate::error::StoreError;
use ledgerlens_domain::DocumentId;
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// In-memory set of documents whose graph is loaded
#[derive(Debug, Default)]
pub struct LoadedRegistry {
    loaded: RwLock<BTreeSet<DocumentId>>,
}

impl LoadedRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeSet<DocumentId>> {
        self.loaded.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeSet<DocumentId>> {
        self.loaded.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a document's graph as available for queries
    pub fn mark_loaded(&self, id: &DocumentId) {
        if self.write().insert(id.clone()) {
            info!(document = %id, "Graph is now available for queries");
        }
    }

    /// True when the document's graph is available for queries
    pub fn is_loaded(&self, id: &DocumentId) -> bool {
        self.read().contains(id)
    }

    /// Forget a document (its artifacts were deleted)
    pub fn unload(&self, id: &DocumentId) -> bool {
        self.write().remove(id)
    }

    /// Loaded documents, sorted
    pub fn loaded(&self) -> Vec<DocumentId> {
        self.read().iter().cloned().collect()
    }

    /// Number of loaded documents
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Mark every document whose text and graph artifacts both exist.
    ///
    /// Returns how many documents were newly marked.
    pub fn reconcile_from_disk(&self, store: &ArtifactStore) -> Result<usize, StoreError> {
        let cached = store.cached_documents()?;
        let mut loaded = self.write();
        let added = cached
            .into_iter()
            .filter(|id| loaded.insert(id.clone()))
            .count();
        drop(loaded);

        if added > 0 {
            info!(documents = added, "Reconciled loaded graphs from disk");
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_domain::KnowledgeGraph;

    fn id(name: &str) -> DocumentId {
        DocumentId::from_filename(name).unwrap()
    }

    #[test]
    fn test_mark_and_query() {
        let registry = LoadedRegistry::new();
        assert!(!registry.is_loaded(&id("ACME.pdf")));

        registry.mark_loaded(&id("ACME.pdf"));
        assert!(registry.is_loaded(&id("ACME")));
        assert!(!registry.is_loaded(&id("BETA.pdf")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unload() {
        let registry = LoadedRegistry::new();
        registry.mark_loaded(&id("ACME.pdf"));

        assert!(registry.unload(&id("ACME.pdf")));
        assert!(!registry.unload(&id("ACME.pdf")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reconcile_marks_complete_artifacts_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();

        let complete = id("ACME.pdf");
        store.write_text(&complete, "text").unwrap();
        store.render(&KnowledgeGraph::default(), &complete).unwrap();

        let graph_only = id("BETA.pdf");
        store.render(&KnowledgeGraph::default(), &graph_only).unwrap();

        let registry = LoadedRegistry::new();
        assert_eq!(registry.reconcile_from_disk(&store).unwrap(), 1);
        assert_eq!(registry.loaded(), vec![complete]);

        // Already loaded documents are not counted again
        assert_eq!(registry.reconcile_from_disk(&store).unwrap(), 0);
    }
}
