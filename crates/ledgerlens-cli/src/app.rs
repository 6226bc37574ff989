//! Services wired from the configuration.

use crate::config::Config;
use crate::error::Result;
use crate::provider::{LazyProvider, Purpose};
use ledgerlens_extractor::LlmGraphExtractor;
use ledgerlens_pipeline::{DocumentService, QueryService};
use ledgerlens_store::{ArtifactStore, LoadedRegistry};
use std::sync::Arc;
use tracing::debug;

/// Document service as configured for the CLI
pub type Documents = DocumentService<LlmGraphExtractor<Arc<LazyProvider>>>;

/// Query service as configured for the CLI
pub type Query = QueryService<LazyProvider>;

/// Everything a command needs
pub struct App {
    config: Config,
    extraction: Arc<LazyProvider>,
    answering: Arc<LazyProvider>,
    documents: Documents,
    query: Query,
}

impl App {
    /// Open the data directory and build the services.
    ///
    /// Graphs generated by earlier runs are marked loaded.
    pub fn open(config: Config) -> Result<Self> {
        let store = Arc::new(ArtifactStore::open(&config.data_dir)?);
        let registry = Arc::new(LoadedRegistry::new());
        let restored = registry.reconcile_from_disk(&store)?;
        debug!(restored, data_dir = %config.data_dir.display(), "Opened data directory");

        let extraction = Arc::new(LazyProvider::new(config.llm.clone(), Purpose::Extraction));
        let answering = Arc::new(LazyProvider::new(config.llm.clone(), Purpose::Query));

        let documents = DocumentService::new(
            store,
            Arc::clone(&registry),
            LlmGraphExtractor::new(Arc::clone(&extraction)),
            config.pipeline.clone(),
        )?
        .with_public_url(config.graph_server.public_url.clone());

        let query = QueryService::new(Arc::clone(&answering), registry);

        Ok(Self {
            config,
            extraction,
            answering,
            documents,
            query,
        })
    }

    /// Loaded configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Document lifecycle service
    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    /// Question answering service
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Fail early when the extraction model cannot be built
    pub fn ensure_extraction_ready(&self) -> Result<()> {
        self.extraction.get()?;
        Ok(())
    }

    /// Fail early when the answering model cannot be built
    pub fn ensure_query_ready(&self) -> Result<()> {
        self.answering.get()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use ledgerlens_domain::{DocumentId, KnowledgeGraph};

    #[test]
    fn test_open_restores_processed_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = dir.path().to_path_buf();
        config.llm.provider = ProviderKind::Mock;

        let id = DocumentId::from_filename("ACME.pdf").unwrap();
        {
            let store = ArtifactStore::open(dir.path()).unwrap();
            store.write_text(&id, "Item 1. Business").unwrap();
            store.render(&KnowledgeGraph::default(), &id).unwrap();
        }

        let app = App::open(config).unwrap();
        assert!(app.documents().registry().is_loaded(&id));
        assert!(app.ensure_extraction_ready().is_ok());
        assert!(app.ensure_query_ready().is_ok());
    }
}
