pub mod document;
pub mod job;
pub mod result;

pub use document::{Document, DocumentKind};
pub use job::JobDescription;
pub use result::{ResultSet, ScoringResult};
