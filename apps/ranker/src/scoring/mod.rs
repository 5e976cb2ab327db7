//! Per-document scoring: compose the prompt, call the model, interpret the answer.
//!
//! The batch coordinator only sees the `DocumentScorer` trait, so the LLM-backed
//! scorer can be swapped for a stub without touching the loop.

pub mod interpreter;
pub mod invoker;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm_client::LanguageModel;
use crate::models::JobDescription;
use crate::scoring::interpreter::ScoreOutcome;
use crate::scoring::invoker::ScoringInvoker;
use crate::scoring::prompts::compose;

#[async_trait]
pub trait DocumentScorer: Send + Sync {
    async fn score(&self, document_text: &str, job_description: &JobDescription) -> ScoreOutcome;
}

/// Scores documents with a language model.
pub struct LlmScorer {
    invoker: ScoringInvoker,
}

impl LlmScorer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            invoker: ScoringInvoker::new(model),
        }
    }
}

#[async_trait]
impl DocumentScorer for LlmScorer {
    async fn score(&self, document_text: &str, job_description: &JobDescription) -> ScoreOutcome {
        let prompt = compose(job_description.as_str(), document_text);
        self.invoker.invoke(&prompt).await.into_outcome()
    }
}
