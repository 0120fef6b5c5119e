//! Bulk mutate job workflow
//!
//! A job is created locally, uploaded in labelled parts, polled until the
//! remote service reports a terminal status, then its per-part results are
//! fetched:
//!
//! UNSUBMITTED → PENDING → PROCESSING → {COMPLETED | FAILED}

mod coordinator;
mod error;
mod handle;
mod remote;
mod status;

pub use coordinator::JobCoordinator;
pub use error::{CoordinatorResult, JobError};
pub use handle::{JobHandle, JobId, JobOutcome, JobPart, JobResult};
pub use remote::{JobService, StatusReport, SubmitAck, SubmitRequest};
pub use status::{JobStatus, TerminalState};
