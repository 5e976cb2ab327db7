use std::sync::Arc;

use crate::errors::RankerError;

const PREVIEW_CHARS: usize = 100;

/// The role description every resume is scored against.
///
/// Non-empty by construction. Cloning shares the underlying text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescription(Arc<str>);

impl JobDescription {
    /// Trims the text and rejects it if nothing is left.
    pub fn new(text: &str) -> Result<Self, RankerError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RankerError::EmptyJobDescription);
        }
        Ok(Self(Arc::from(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 100 characters, with `...` appended when the text was cut.
    pub fn preview(&self) -> String {
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}
