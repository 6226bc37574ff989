//! Question answering over a loaded knowledge graph

use ledgerlens_domain::{DocumentId, LlmProvider};
use ledgerlens_store::LoadedRegistry;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Returned by [`QueryService::answer`] when the graph is not loaded
pub const NOT_LOADED_MESSAGE: &str = "The knowledge graph for this document must be generated first.";

/// Returned by [`QueryService::answer`] when the oracle call fails
pub const ORACLE_FAILURE_MESSAGE: &str =
    "An error occurred while communicating with the language model.";

const NO_SOURCE_MESSAGE: &str = "A data source must be selected for querying.";
const NOT_PROCESSED_MESSAGE: &str =
    "The selected document has not been processed. Please process it first.";

/// One exchange in a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// What the user asked
    pub question: String,
    /// What was shown in reply
    pub answer: String,
}

/// Query Oracle Adapter
pub struct QueryService<L: ?Sized> {
    llm: Arc<L>,
    registry: Arc<LoadedRegistry>,
}

impl<L: ?Sized> Clone for QueryService<L> {
    fn clone(&self) -> Self {
        Self {
            llm: Arc::clone(&self.llm),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<L> QueryService<L>
where
    L: LlmProvider + Send + Sync + ?Sized + 'static,
    L::Error: Display + Send + 'static,
{
    /// Create a query service answering from documents in `registry`
    pub fn new(llm: Arc<L>, registry: Arc<LoadedRegistry>) -> Self {
        Self { llm, registry }
    }

    /// Answer `question` about a loaded document.
    ///
    /// Never fails: an unloaded document or a failed oracle call yields a
    /// fixed message instead.
    pub async fn answer(&self, document: &DocumentId, question: &str) -> String {
        if !self.registry.is_loaded(document) {
            return NOT_LOADED_MESSAGE.to_string();
        }

        let prompt = grounding_prompt(document, question);
        let llm = Arc::clone(&self.llm);
        let result = tokio::task::spawn_blocking(move || llm.generate(&prompt)).await;

        match result {
            Ok(Ok(answer)) => {
                debug!(document = %document, chars = answer.len(), "Answered question");
                answer
            }
            Ok(Err(e)) => {
                warn!(document = %document, error = %e, "Query oracle failed");
                ORACLE_FAILURE_MESSAGE.to_string()
            }
            Err(e) => {
                warn!(document = %document, error = %e, "Query task failed");
                ORACLE_FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// Handle one chat message, appending the exchange to `history`.
    ///
    /// Returns the reply that was appended.
    pub async fn chat_turn(
        &self,
        file_name: Option<&str>,
        question: &str,
        history: &mut Vec<ChatTurn>,
    ) -> String {
        let document = file_name
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .and_then(DocumentId::from_filename);

        let answer = match document {
            None => NO_SOURCE_MESSAGE.to_string(),
            Some(id) if !self.registry.is_loaded(&id) => NOT_PROCESSED_MESSAGE.to_string(),
            Some(id) => self.answer(&id, question).await,
        };

        history.push(ChatTurn {
            question: question.to_string(),
            answer: answer.clone(),
        });
        answer
    }
}

fn grounding_prompt(document: &DocumentId, question: &str) -> String {
    format!(
        "You are a financial analysis system. Your knowledge is from a knowledge graph of the \
         10-K filing for '{}'. The user has asked: '{}'. Provide a direct, professional answer \
         as if retrieving data from the graph. Do not mention the simulation or the graph itself.",
        document, question
    )
}
