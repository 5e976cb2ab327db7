// Batch scoring and the ranked report.
// The coordinator owns the ResultSet for a run; the reporter only borrows it.

pub mod coordinator;
pub mod report;
