//! Job run summary and failure taxonomy

mod failure;
mod job_summary;

pub use failure::{ExitCode, FailureKind, Status};
pub use job_summary::{JobSummary, PartSummary, SUMMARY_SCHEMA_ID, SUMMARY_SCHEMA_VERSION};
