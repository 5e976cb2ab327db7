use std::path::PathBuf;

use thiserror::Error;

/// Run-level error type.
///
/// Only batch preconditions and report persistence surface here. Anything that goes
/// wrong with a single document is converted into a skip or a degraded score long
/// before it could reach this type.
#[derive(Debug, Error)]
pub enum RankerError {
    #[error("Job description file not found at {}", .0.display())]
    JobDescriptionNotFound(PathBuf),

    #[error("Job description file is empty")]
    EmptyJobDescription,

    #[error("Failed to read job description {}: {source}", path.display())]
    ReadJobDescription {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Data folder not found or not a directory: {}", .0.display())]
    DataFolderNotFound(PathBuf),

    #[error("No resume files found in {}", .0.display())]
    NoDocuments(PathBuf),

    #[error("No resumes were successfully processed")]
    NothingScored,

    #[error("Failed to write report to {}: {source}", path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_have_distinct_messages() {
        let missing = RankerError::JobDescriptionNotFound(PathBuf::from("./jd.txt"));
        let empty = RankerError::EmptyJobDescription;
        assert_eq!(missing.to_string(), "Job description file not found at ./jd.txt");
        assert_eq!(empty.to_string(), "Job description file is empty");
    }

    #[test]
    fn test_report_write_keeps_io_source() {
        let err = RankerError::ReportWrite {
            path: PathBuf::from("out/results.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("out/results.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
