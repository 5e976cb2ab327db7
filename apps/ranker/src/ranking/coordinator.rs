//! Batch Coordinator - scores documents one at a time, in source path order.
//!
//! Per document: skip blank content → score → attach filename/kind → append → checkpoint.
//! A failing document never stops the batch; it is logged and left out of the results.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use chrono::Local;
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::models::{Document, JobDescription, ResultSet, ScoringResult};
use crate::ranking::report::render;
use crate::scoring::DocumentScorer;

/// Why a document produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyContent,
    /// The scoring pipeline panicked; carries the panic message.
    ScoringPanicked(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyContent => f.write_str("extracted content is empty"),
            SkipReason::ScoringPanicked(msg) => write!(f, "scoring aborted: {msg}"),
        }
    }
}

/// Called after every successful append.
pub trait ProgressSink {
    fn on_result(&mut self, results: &ResultSet);
}

/// Sink that does nothing; used when checkpointing is disabled.
pub struct NoCheckpoint;

impl ProgressSink for NoCheckpoint {
    fn on_result(&mut self, _results: &ResultSet) {}
}

/// Re-renders and atomically rewrites the report after each scored document,
/// so an interrupted run still leaves a current partial ranking on disk.
pub struct ReportCheckpoint {
    path: PathBuf,
    job_description: JobDescription,
}

impl ReportCheckpoint {
    pub fn new(path: PathBuf, job_description: JobDescription) -> Self {
        Self {
            path,
            job_description,
        }
    }
}

impl ProgressSink for ReportCheckpoint {
    fn on_result(&mut self, results: &ResultSet) {
        let report = render(results, &self.job_description, Local::now().naive_local());
        if let Err(e) = report.write_atomic(&self.path) {
            warn!("Checkpoint write failed: {e}");
        }
    }
}

/// Scores a single document.
pub async fn score_document(
    document: &Document,
    job_description: &JobDescription,
    scorer: &dyn DocumentScorer,
) -> Result<ScoringResult, SkipReason> {
    if document.is_blank() {
        return Err(SkipReason::EmptyContent);
    }

    let outcome = AssertUnwindSafe(scorer.score(&document.content, job_description))
        .catch_unwind()
        .await
        .map_err(|payload| SkipReason::ScoringPanicked(panic_message(payload.as_ref())))?;

    Ok(ScoringResult {
        score: outcome.score,
        reasoning: outcome.reasoning,
        filename: document.filename.clone(),
        kind: document.kind,
    })
}

/// Scores every document in source path order and returns the accumulated results.
/// An empty input returns an empty set without calling the scorer.
pub async fn run_batch(
    mut documents: Vec<Document>,
    job_description: &JobDescription,
    scorer: &dyn DocumentScorer,
    progress: &mut dyn ProgressSink,
) -> ResultSet {
    let mut results = ResultSet::new();
    if documents.is_empty() {
        return results;
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    let total = documents.len();

    for (index, document) in documents.iter().enumerate() {
        let position = index + 1;
        match score_document(document, job_description, scorer).await {
            Ok(result) => {
                info!(
                    "[{position}/{total}] Scored {}: {:.1}",
                    result.filename, result.score
                );
                results.push(result);
                progress.on_result(&results);
            }
            Err(reason @ SkipReason::EmptyContent) => {
                warn!("[{position}/{total}] Skipped {}: {reason}", document.filename);
            }
            Err(reason) => {
                error!("[{position}/{total}] Failed to score {}: {reason}", document.filename);
            }
        }
    }

    info!("Scored {} of {} documents", results.len(), total);
    results
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
