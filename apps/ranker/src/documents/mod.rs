//! Input loading: job description file and the folder of resumes.

pub mod extract;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::documents::extract::extract_document;
use crate::errors::RankerError;
use crate::models::{Document, DocumentKind, JobDescription};

/// Outcome of scanning a data folder.
#[derive(Debug, Default)]
pub struct DocumentScan {
    pub documents: Vec<Document>,
    pub total_found: usize,
    pub pdf_count: usize,
    pub docx_count: usize,
    pub skipped: Vec<(String, String)>, // (filename, reason)
}

/// Loads the job description. A missing file and an empty file are distinct errors.
pub fn load_job_description(path: &Path) -> Result<JobDescription, RankerError> {
    if !path.exists() {
        return Err(RankerError::JobDescriptionNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| RankerError::ReadJobDescription {
        path: path.to_path_buf(),
        source,
    })?;
    JobDescription::new(&text)
}

/// Recursively collects `.pdf`/`.docx` files under `folder`, sorted by path.
/// Unreadable subdirectories are logged and skipped. Symlinked directories are
/// not descended into; symlinked files are kept.
pub fn gather_document_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![folder.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read directory {}: {e}", dir.display());
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(path);
            } else if path.is_file() && DocumentKind::from_path(&path).is_some() {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Extracts every supported file under `folder`. Files that cannot be read or
/// yield no text are recorded in `skipped` and never fail the scan.
pub fn scan_documents(folder: &Path) -> DocumentScan {
    let files = gather_document_files(folder);
    let mut scan = DocumentScan {
        total_found: files.len(),
        ..DocumentScan::default()
    };

    for path in files {
        match DocumentKind::from_path(&path) {
            Some(DocumentKind::Pdf) => scan.pdf_count += 1,
            Some(DocumentKind::Docx) => scan.docx_count += 1,
            None => {}
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match extract_document(&path) {
            Ok(document) => {
                debug!("Extracted {} ({} chars)", name, document.content.len());
                scan.documents.push(document);
            }
            Err(e) => {
                warn!("Skipping {name}: {e}");
                scan.skipped.push((name, e.to_string()));
            }
        }
    }

    scan
}
