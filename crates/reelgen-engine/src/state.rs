//! Job state machine
//!
//! Wraps a [`Job`] and owns every status mutation. The lifecycle is
//! one-directional (`Generating -> {Completed, Failed}`); once terminal,
//! further transitions are rejected rather than ignored.

use reelgen_types::{Job, JobStatus, ReelgenError, Result};

/// The single mutable Job record, guarded by transition rules.
///
/// During polling the poller holds exclusive write access; observers read
/// between polls through the surrounding lock.
#[derive(Debug)]
pub struct JobState {
    job: Job,
}

impl JobState {
    /// Wrap a freshly created job (status `Generating`).
    pub fn new(job: Job) -> Self {
        Self { job }
    }

    /// Read access to the underlying record.
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Current status.
    pub fn status(&self) -> &JobStatus {
        &self.job.status
    }

    /// Whether the job reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.job.status.is_terminal()
    }

    /// Transition to `Completed`, attaching the artifact reference when the
    /// completion payload exposed one.
    pub fn complete(&mut self, artifact_url: Option<String>) -> Result<()> {
        self.advance(JobStatus::Completed)?;
        self.job.artifact_url = artifact_url;
        tracing::info!(
            job = %self.job.id,
            artifact = self.job.artifact_url.as_deref().unwrap_or("<none>"),
            "job completed"
        );
        Ok(())
    }

    /// Transition to `Failed` with a human-readable reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.advance(JobStatus::Failed)?;
        let reason = reason.into();
        tracing::warn!(job = %self.job.id, %reason, "job failed");
        self.job.failure_reason = Some(reason);
        Ok(())
    }

    fn advance(&mut self, next: JobStatus) -> Result<()> {
        if !self.job.status.permits(&next) {
            return Err(ReelgenError::InvalidTransition {
                from: self.job.status.clone(),
                to: next,
            });
        }
        self.job.status = next;
        Ok(())
    }
}
