//! Bulk mutate job coordinator
//!
//! Drives one job through its lifecycle:
//! create locally → submit part 0 (id assigned) → submit parts 1..N-1
//! against that id → poll until COMPLETED or FAILED → fetch one result per
//! part index.
//!
//! Submissions are never retried: a lost response leaves it unknown whether
//! the part was applied, and the remote offers no idempotency key. Status
//! queries are read-only and are retried up to a bounded count.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::polling::{Deadline, PollConfig};

use super::error::{CoordinatorResult, JobError};
use super::handle::{JobHandle, JobId, JobOutcome, JobPart, JobResult};
use super::remote::{JobService, SubmitRequest};
use super::status::{JobStatus, TerminalState};

/// Coordinates multi-part bulk mutate jobs against a [`JobService`]
pub struct JobCoordinator<S> {
    service: S,
}

impl<S: JobService> JobCoordinator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Create a local handle for a job of `total_parts` parts.
    pub fn create_job(&self, total_parts: u32) -> CoordinatorResult<JobHandle> {
        if total_parts < 1 {
            return Err(JobError::InvalidArgument(
                "a job needs at least one part".to_string(),
            ));
        }
        Ok(JobHandle::new(total_parts))
    }

    /// Submit one part.
    ///
    /// The first accepted part creates the job remotely and assigns the id;
    /// later parts are appended to it. Exactly one remote call.
    pub fn submit_part(&self, handle: &mut JobHandle, part: &JobPart) -> CoordinatorResult<JobId> {
        if part.part_index >= handle.total_parts() {
            return Err(JobError::InvalidArgument(format!(
                "part index {} is outside [0, {})",
                part.part_index,
                handle.total_parts()
            )));
        }
        if handle.status().is_terminal() {
            return Err(JobError::InvalidState(format!(
                "job is already {}",
                handle.status()
            )));
        }

        let request = SubmitRequest {
            job_id: handle.id(),
            part_index: part.part_index,
            total_parts: handle.total_parts(),
            operations: &part.operations,
            scope: part.scope,
            is_first_part: handle.id().is_none(),
        };

        let ack = self
            .service
            .submit_job(&request)
            .map_err(JobError::from_service)?;

        let job_id = match (handle.id(), ack.job_id) {
            (Some(existing), Some(reported)) if existing != reported => {
                warn!(%existing, %reported, "remote reported a different job id, keeping the original");
                existing
            }
            (Some(existing), _) => existing,
            (None, Some(reported)) if reported.value() > 0 => {
                handle.assign_id(reported);
                reported
            }
            (None, _) => {
                return Err(JobError::RemoteRejected {
                    message: "job creation response carried no job id".to_string(),
                    code: None,
                });
            }
        };

        handle.record_part(part.part_index);

        match ack.raw_status.as_deref().map(|raw| (raw, JobStatus::from_remote(raw))) {
            Some((_, Some(status))) => handle.set_status(status),
            Some((raw, None)) => {
                warn!(%job_id, raw_status = raw, "unrecognised status in submit response");
                if handle.status() == JobStatus::Unsubmitted {
                    handle.set_status(JobStatus::Pending);
                }
            }
            None => {
                if handle.status() == JobStatus::Unsubmitted {
                    handle.set_status(JobStatus::Pending);
                }
            }
        }

        info!(
            %job_id,
            part_index = part.part_index,
            total_parts = handle.total_parts(),
            operations = part.operations.len(),
            status = %handle.status(),
            "submitted job part"
        );

        Ok(job_id)
    }

    /// Block until the job reaches COMPLETED or FAILED.
    ///
    /// Sleeps one interval before every status query. Returns `Timeout`
    /// once the deadline passes, `Cancelled` as soon as the token is raised.
    pub fn await_completion(
        &self,
        handle: &mut JobHandle,
        config: &PollConfig,
        cancel: &CancelToken,
    ) -> CoordinatorResult<JobOutcome> {
        config
            .validate()
            .map_err(|e| JobError::InvalidArgument(e.to_string()))?;

        let job_id = handle.id().ok_or_else(|| {
            JobError::InvalidState("job has not been submitted".to_string())
        })?;

        let started = Instant::now();
        if handle.status().is_terminal() {
            return Ok(JobOutcome {
                status: handle.status(),
                elapsed_polls: 0,
                elapsed: started.elapsed(),
            });
        }

        let deadline = Deadline::after(config.timeout);
        let mut polls: u32 = 0;
        let mut consecutive_failures: u32 = 0;

        loop {
            if cancel.wait_for(deadline.next_wait(config.interval)) {
                info!(%job_id, polls, "wait cancelled");
                return Err(JobError::Cancelled { polls });
            }
            if deadline.is_expired() {
                warn!(%job_id, polls, status = %handle.status(), "timed out waiting for job");
                return Err(JobError::Timeout {
                    polls,
                    elapsed: deadline.elapsed(),
                });
            }

            polls += 1;
            let report = match self.service.query_job_status(job_id, None) {
                Ok(report) => {
                    consecutive_failures = 0;
                    report
                }
                Err(e) => {
                    consecutive_failures += 1;
                    if consecutive_failures > config.max_status_retries {
                        return Err(JobError::RemoteUnavailable {
                            message: format!(
                                "status query failed {} times in a row: {}",
                                consecutive_failures, e
                            ),
                        });
                    }
                    warn!(
                        %job_id,
                        attempt = consecutive_failures,
                        max_retries = config.max_status_retries,
                        error = %e,
                        "status query failed, retrying"
                    );
                    continue;
                }
            };

            let raw = report.raw_status.unwrap_or_default();
            let status = JobStatus::from_remote(&raw).ok_or_else(|| JobError::RemoteUnavailable {
                message: format!("unrecognised job status '{}'", raw),
            })?;

            if !handle.status().can_transition_to(status) {
                warn!(%job_id, from = %handle.status(), to = %status, "unexpected status transition");
            }
            handle.set_status(status);
            debug!(%job_id, poll = polls, %status, "polled job status");

            if status.is_terminal() {
                let outcome = JobOutcome {
                    status,
                    elapsed_polls: polls,
                    elapsed: deadline.elapsed(),
                };
                info!(%job_id, %status, polls, "job finished");
                return Ok(outcome);
            }
        }
    }

    /// Fetch the result of every part, in ascending part order.
    ///
    /// Only valid once the job was observed COMPLETED.
    pub fn fetch_results(&self, handle: &JobHandle) -> CoordinatorResult<Vec<JobResult>> {
        if handle.status() != JobStatus::Completed {
            return Err(JobError::InvalidState(format!(
                "results are only available for COMPLETED jobs, job is {}",
                handle.status()
            )));
        }
        let job_id = handle.id().ok_or_else(|| {
            JobError::InvalidState("job has not been submitted".to_string())
        })?;

        let mut results = Vec::with_capacity(handle.total_parts() as usize);
        for part_index in 0..handle.total_parts() {
            let report = self
                .service
                .query_job_status(job_id, Some(part_index))
                .map_err(JobError::from_service)?;

            let payload = report.result.ok_or_else(|| JobError::RemoteUnavailable {
                message: format!("no result returned for part {}", part_index),
            })?;
            if payload.part_index != part_index {
                return Err(JobError::RemoteUnavailable {
                    message: format!(
                        "asked for part {} but received part {}",
                        part_index, payload.part_index
                    ),
                });
            }

            let result = JobResult::from(payload);
            debug!(%job_id, part_index, succeeded = result.succeeded, failed = result.failed, "fetched part result");
            results.push(result);
        }

        Ok(results)
    }
}
