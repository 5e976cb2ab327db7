//! Scoring Invoker - one model call per prompt, failures folded into a zero score.

use std::sync::Arc;

use tracing::error;

use crate::llm_client::LanguageModel;
use crate::scoring::interpreter::{interpret, ScoreOutcome};

/// Raw result of a single model call.
#[derive(Debug, Clone, PartialEq)]
pub enum RawModelOutput {
    Completed(String),
    /// Transport or model failure, with the rendered cause.
    Failed(String),
}

impl RawModelOutput {
    /// Completed text goes through the interpreter; a failure becomes a
    /// zero score whose reasoning names the cause.
    pub fn into_outcome(self) -> ScoreOutcome {
        match self {
            RawModelOutput::Completed(text) => interpret(&text),
            RawModelOutput::Failed(cause) => ScoreOutcome {
                score: 0.0,
                reasoning: format!("LLM scoring failed: {cause}"),
            },
        }
    }
}

#[derive(Clone)]
pub struct ScoringInvoker {
    model: Arc<dyn LanguageModel>,
}

impl ScoringInvoker {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Never returns an error: a failed call is reported as `RawModelOutput::Failed`.
    pub async fn invoke(&self, prompt: &str) -> RawModelOutput {
        match self.model.complete(prompt).await {
            Ok(text) => RawModelOutput::Completed(text),
            Err(e) => {
                error!("LLM scoring failed: {e}");
                RawModelOutput::Failed(e.to_string())
            }
        }
    }
}
