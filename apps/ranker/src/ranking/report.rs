//! Ranker/Reporter - deterministic text report plus atomic persistence.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;
use tracing::info;

use crate::errors::RankerError;
use crate::models::{JobDescription, ResultSet};

const BANNER: &str = "===========================================";
const RULE: &str = "-------------------------------------------";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rendered report text. Building one performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    text: String,
}

impl Report {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Writes to a temp file next to `path` and renames it into place, so a reader
    /// sees either the previous report or this one, never a partial file.
    pub fn write_atomic(&self, path: &Path) -> Result<(), RankerError> {
        let to_error = |source: std::io::Error| RankerError::ReportWrite {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut temp_file = NamedTempFile::new_in(parent).map_err(to_error)?;
        temp_file.write_all(self.as_str().as_bytes()).map_err(to_error)?;
        temp_file.flush().map_err(to_error)?;
        temp_file.persist(path).map_err(|e| to_error(e.error))?;

        info!("Results written to {}", path.display());
        Ok(())
    }
}

/// Renders the ranking: score descending, ties in scoring order, ranks from 1.
pub fn render(
    results: &ResultSet,
    job_description: &JobDescription,
    generated_at: NaiveDateTime,
) -> Report {
    let mut lines: Vec<String> = vec![
        BANNER.to_string(),
        "RESUME RANKING RESULTS".to_string(),
        BANNER.to_string(),
        format!("Total Resumes Processed: {}", results.len()),
        format!("Job Description: {}", job_description.preview()),
        format!("Generated: {}", generated_at.format(TIMESTAMP_FORMAT)),
        String::new(),
        RULE.to_string(),
        "RANKED RESULTS".to_string(),
        RULE.to_string(),
        String::new(),
    ];

    for entry in results.ranked() {
        lines.push(format!("Rank {}: {}", entry.rank, entry.result.filename));
        lines.push(format!("Score: {:.1}/100", entry.result.score));
        lines.push(format!("Reasoning: {}", entry.result.reasoning.trim()));
        lines.push(String::new());
    }

    Report {
        text: lines.join("\n"),
    }
}
