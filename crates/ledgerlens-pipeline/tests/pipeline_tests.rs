//! Integration tests for ledgerlens-pipeline
//!
//! These drive the document lifecycle end to end with a plain-text reader
//! standing in for PDF extraction and `MockProvider` as the oracle.

use ledgerlens_domain::{DocumentId, GraphDocument, GraphExtractor};
use ledgerlens_extractor::{ExtractorError, LlmGraphExtractor, PipelineConfig};
use ledgerlens_llm::MockProvider;
use ledgerlens_pipeline::{
    ChatTurn, DocumentService, ProgressMessage, QueryService, NOT_LOADED_MESSAGE,
    ORACLE_FAILURE_MESSAGE,
};
use ledgerlens_store::{ArtifactStore, LoadedRegistry, PlainTextReader};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const GRAPH_RESPONSE: &str = r#"{"nodes": [{"id": "Acme Corp", "type": "Company"}, {"id": "Widgets", "type": "Product/Service"}],
 "relationships": [{"source": "Acme Corp", "target": "Widgets", "type": "GENERATES"}]}"#;

fn filing() -> String {
    format!(
        "Form 10-K\n{}\nItem 1. Business\nAcme Corp designs industrial widgets. {}\n\
         Item 1A. Risk Factors\nSupply chain disruption could hurt margins. {}\n\
         Item 2. Properties\nHeadquarters in Springfield.",
        "cover ".repeat(50),
        "Widget sales grew. ".repeat(60),
        "Demand is cyclical. ".repeat(60),
    )
}

struct Harness {
    data: TempDir,
    scratch: TempDir,
    store: Arc<ArtifactStore>,
    registry: Arc<LoadedRegistry>,
    llm: MockProvider,
    service: DocumentService<LlmGraphExtractor<MockProvider>>,
}

impl Harness {
    fn new() -> Self {
        Self::over(tempfile::tempdir().unwrap())
    }

    /// A fresh process over an existing data directory
    fn over(data: TempDir) -> Self {
        let store = Arc::new(ArtifactStore::open(data.path()).unwrap());
        let registry = Arc::new(LoadedRegistry::new());
        let llm = MockProvider::new(GRAPH_RESPONSE);

        let service = DocumentService::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            LlmGraphExtractor::new(llm.clone()),
            PipelineConfig::default(),
        )
        .unwrap()
        .with_reader(PlainTextReader)
        .with_public_url("http://graphs.local:7861/");

        Self {
            data,
            scratch: tempfile::tempdir().unwrap(),
            store,
            registry,
            llm,
            service,
        }
    }

    fn upload(&self, name: &str, text: &str) -> String {
        let source = self.scratch.path().join(name);
        fs::write(&source, text).unwrap();
        self.service.upload(&source).unwrap()
    }

    async fn process(&self, name: Option<&str>) -> (Vec<(f32, String)>, ProgressMessage) {
        let mut stages = Vec::new();
        let terminal = self
            .service
            .process(name)
            .wait_for_terminal(|fraction, text| stages.push((fraction, text.to_string())))
            .await
            .expect("worker ended without a terminal message");
        (stages, terminal)
    }
}

fn id(name: &str) -> DocumentId {
    DocumentId::from_filename(name).unwrap()
}

#[tokio::test]
async fn test_full_run_writes_artifacts_and_marks_loaded() {
    let h = Harness::new();
    h.upload("ACME.pdf", &filing());

    let (stages, terminal) = h.process(Some("ACME.pdf")).await;

    let texts: Vec<&str> = stages.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts.first(), Some(&"Analyzing document structure..."));
    assert!(texts.contains(&"Generating knowledge graph from key sections..."));
    assert!(texts.contains(&"Processing chunk 1/1"));
    assert_eq!(texts.last(), Some(&"Preparing graph for analysis..."));
    assert!(stages.windows(2).all(|w| w[0].0 <= w[1].0));

    match terminal {
        ProgressMessage::Complete {
            artifact_path,
            text,
            document,
        } => {
            assert_eq!(text, "Successfully processed ACME.pdf.");
            assert_eq!(document, id("ACME"));
            assert_eq!(artifact_path, h.store.graph_path(&document));
            let html = fs::read_to_string(artifact_path).unwrap();
            assert!(html.contains(r#""label":"GENERATES""#));
        }
        other => panic!("unexpected terminal message {:?}", other),
    }

    assert!(h.registry.is_loaded(&id("ACME")));
    let text = h.store.read_text(&id("ACME")).unwrap();
    assert!(text.contains("--- EXTRACTED SECTION: Item 1. Business ---"));
    assert!(!text.contains("Headquarters in Springfield."));
    assert_eq!(h.llm.call_count(), 1);
}

#[tokio::test]
async fn test_cached_document_skips_the_oracle() {
    let h = Harness::new();
    h.upload("ACME.pdf", &filing());
    h.process(Some("ACME.pdf")).await;
    let calls = h.llm.call_count();

    let (stages, terminal) = h.process(Some("ACME.pdf")).await;

    assert!(stages.is_empty());
    assert_eq!(
        terminal,
        ProgressMessage::Complete {
            artifact_path: h.store.graph_path(&id("ACME")),
            text: "Loaded cached results for ACME.pdf.".to_string(),
            document: id("ACME"),
        }
    );
    assert_eq!(h.llm.call_count(), calls);
}

#[tokio::test]
async fn test_cache_hit_after_restart_marks_loaded() {
    let first = Harness::new();
    first.upload("ACME.pdf", &filing());
    first.process(Some("ACME.pdf")).await;

    let restarted = Harness::over(first.data);
    assert!(!restarted.registry.is_loaded(&id("ACME")));

    let (_, terminal) = restarted.process(Some("ACME.pdf")).await;
    assert!(matches!(terminal, ProgressMessage::Complete { .. }));
    assert!(restarted.registry.is_loaded(&id("ACME")));
    assert_eq!(restarted.llm.call_count(), 0);
}

#[tokio::test]
async fn test_short_document_is_rejected_without_artifacts() {
    let h = Harness::new();
    h.upload("SCAN.pdf", "Item 1. Business\nToo short.");

    let (_, terminal) = h.process(Some("SCAN.pdf")).await;

    match terminal {
        ProgressMessage::Error(message) => {
            assert!(message.starts_with("PDF file can't be processed"));
            assert!(!message.starts_with("An unexpected error occurred"));
        }
        other => panic!("unexpected terminal message {:?}", other),
    }
    assert!(!h.store.text_path(&id("SCAN")).exists());
    assert!(!h.store.has_graph(&id("SCAN")));
    assert!(!h.registry.is_loaded(&id("SCAN")));
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn test_missing_selection_and_missing_upload() {
    let h = Harness::new();

    let (_, terminal) = h.process(None).await;
    assert_eq!(
        terminal,
        ProgressMessage::Error("Please select a document.".to_string())
    );

    let (_, terminal) = h.process(Some("GHOST.pdf")).await;
    match terminal {
        ProgressMessage::Error(message) => {
            assert!(message.starts_with("An unexpected error occurred: "));
            assert!(message.contains("GHOST.pdf"));
        }
        other => panic!("unexpected terminal message {:?}", other),
    }
}

#[tokio::test]
async fn test_failing_chunk_still_completes() {
    let h = Harness::new();
    h.upload("ACME.pdf", &filing());
    let mut llm = h.llm.clone();
    llm.add_error_containing("Acme Corp designs");

    let (_, terminal) = h.process(Some("ACME.pdf")).await;

    assert!(matches!(terminal, ProgressMessage::Complete { .. }));
    assert!(h.store.has_graph(&id("ACME")));
}

/// Holds each chunk long enough for a second request to arrive
struct SlowExtractor;

impl GraphExtractor for SlowExtractor {
    type Error = ExtractorError;

    fn extract_one(&self, _chunk: &str) -> Result<GraphDocument, Self::Error> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(GraphDocument::empty())
    }
}

#[tokio::test]
async fn test_concurrent_request_for_same_document_is_refused() {
    let data = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(ArtifactStore::open(data.path()).unwrap());
    let service = DocumentService::new(
        Arc::clone(&store),
        Arc::new(LoadedRegistry::new()),
        SlowExtractor,
        PipelineConfig::default(),
    )
    .unwrap()
    .with_reader(PlainTextReader);

    let source = scratch.path().join("ACME.pdf");
    fs::write(&source, filing()).unwrap();
    service.upload(&source).unwrap();

    let mut first = service.process(Some("ACME.pdf"));
    let mut second = service.process(Some("ACME.pdf"));

    assert_eq!(
        second.wait_for_terminal(|_, _| {}).await,
        Some(ProgressMessage::Error(
            "ACME.pdf is already being processed.".to_string()
        ))
    );
    assert!(service.list_documents().unwrap()[0].processing);

    let terminal = first.wait_for_terminal(|_, _| {}).await;
    assert!(matches!(terminal, Some(ProgressMessage::Complete { .. })));
    assert!(!service.list_documents().unwrap()[0].processing);
}

#[tokio::test]
async fn test_delete_refused_while_processing() {
    let data = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(ArtifactStore::open(data.path()).unwrap());
    let registry = Arc::new(LoadedRegistry::new());
    let service = DocumentService::new(
        Arc::clone(&store),
        Arc::clone(&registry),
        SlowExtractor,
        PipelineConfig::default(),
    )
    .unwrap()
    .with_reader(PlainTextReader);

    let source = scratch.path().join("X.pdf");
    fs::write(&source, filing()).unwrap();
    service.upload(&source).unwrap();

    let mut run = service.process(Some("X.pdf"));
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(
        service.delete(Some("X.pdf")),
        "X.pdf is being processed; try again when it finishes."
    );
    assert!(store.upload_path("X.pdf").is_some());

    let terminal = run.wait_for_terminal(|_, _| {}).await;
    assert!(matches!(terminal, Some(ProgressMessage::Complete { .. })));
    assert!(registry.is_loaded(&id("X")));

    assert_eq!(
        service.delete(Some("X.pdf")),
        "Successfully deleted 'X.pdf' and its associated cache files."
    );
    assert!(store.list_uploads().unwrap().is_empty());
    assert!(!store.has_graph(&id("X")));
    assert!(!registry.is_loaded(&id("X")));
}

#[tokio::test]
async fn test_delete_statuses_and_isolation() {
    let h = Harness::new();
    h.upload("X.pdf", &filing());
    h.upload("Y.pdf", &filing());
    h.process(Some("X.pdf")).await;
    h.process(Some("Y.pdf")).await;

    assert_eq!(h.service.delete(None), "No file selected.");
    assert_eq!(
        h.service.delete(Some("X.pdf")),
        "Successfully deleted 'X.pdf' and its associated cache files."
    );
    assert!(!h.registry.is_loaded(&id("X")));
    assert!(!h.store.text_path(&id("X")).exists());
    assert!(!h.store.has_graph(&id("X")));

    assert!(h.registry.is_loaded(&id("Y")));
    assert!(h.store.has_cached_artifacts(&id("Y")));

    assert_eq!(
        h.service.delete(Some("X.pdf")),
        "No files found to delete for 'X.pdf'."
    );
}

#[tokio::test]
async fn test_visualization_snippets() {
    let h = Harness::new();
    h.upload("ACME.pdf", &filing());

    assert_eq!(
        h.service.load_visualization(None),
        "<h3>Select a processed document to view its knowledge graph.</h3>"
    );
    assert_eq!(
        h.service.load_visualization(Some("ACME.pdf")),
        "<h3>Graph not found for 'ACME.pdf'.</h3><p>Please process the document first.</p>"
    );

    h.process(Some("ACME.pdf")).await;
    assert_eq!(
        h.service.load_visualization(Some("ACME.pdf")),
        r#"<iframe src="http://graphs.local:7861/graphs/ACME.html" width="100%" height="100%"></iframe>"#
    );
    assert_eq!(
        h.service.graph_artifact("ACME.pdf"),
        Some(h.store.graph_path(&id("ACME")))
    );
}

#[tokio::test]
async fn test_list_documents_reports_state() {
    let h = Harness::new();
    h.upload("ACME.pdf", &filing());
    h.upload("BETA.pdf", &filing());
    h.process(Some("ACME.pdf")).await;

    let docs = h.service.list_documents().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].file_name, "ACME.pdf");
    assert!(docs[0].cached && docs[0].loaded);
    assert_eq!(docs[1].file_name, "BETA.pdf");
    assert!(!docs[1].cached && !docs[1].loaded);
}

#[tokio::test]
async fn test_query_is_gated_on_loaded_registry() {
    let registry = Arc::new(LoadedRegistry::new());
    let llm = MockProvider::new("Revenue was $10B in fiscal 2024.");
    let query = QueryService::new(Arc::new(llm.clone()), Arc::clone(&registry));

    let answer = query.answer(&id("X"), "What was revenue?").await;
    assert_eq!(answer, NOT_LOADED_MESSAGE);
    assert_eq!(llm.call_count(), 0);

    registry.mark_loaded(&id("X"));
    let answer = query.answer(&id("X"), "What was revenue?").await;
    assert_eq!(answer, "Revenue was $10B in fiscal 2024.");
    assert_eq!(llm.call_count(), 1);
    assert!(llm.prompts()[0].contains("10-K filing for 'X'"));
}

#[tokio::test]
async fn test_query_oracle_failure_is_contained() {
    let registry = Arc::new(LoadedRegistry::new());
    registry.mark_loaded(&id("X"));
    let mut llm = MockProvider::default();
    llm.add_error_containing("revenue");
    let query = QueryService::new(Arc::new(llm), registry);

    assert_eq!(
        query.answer(&id("X"), "What was revenue?").await,
        ORACLE_FAILURE_MESSAGE
    );
}

#[tokio::test]
async fn test_chat_turns_append_history() {
    let registry = Arc::new(LoadedRegistry::new());
    let llm = MockProvider::new("Supply chain risk.");
    let query = QueryService::new(Arc::new(llm.clone()), Arc::clone(&registry));
    let mut history = Vec::new();

    let reply = query.chat_turn(None, "Main risks?", &mut history).await;
    assert_eq!(reply, "A data source must be selected for querying.");

    let reply = query
        .chat_turn(Some("ACME.pdf"), "Main risks?", &mut history)
        .await;
    assert_eq!(
        reply,
        "The selected document has not been processed. Please process it first."
    );

    registry.mark_loaded(&id("ACME"));
    query
        .chat_turn(Some("ACME.pdf"), "Main risks?", &mut history)
        .await;

    assert_eq!(history.len(), 3);
    assert_eq!(
        history[2],
        ChatTurn {
            question: "Main risks?".to_string(),
            answer: "Supply chain risk.".to_string(),
        }
    );
    assert_eq!(llm.call_count(), 1);
}
