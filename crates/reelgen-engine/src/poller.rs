//! Bounded polling of a long-running operation
//!
//! The poller is a spawned task that suspends one interval between status
//! queries (cooperative wait, never busy-polling) and stops at the first
//! terminal observation or when the attempt ceiling is reached. It owns the
//! shared [`JobState`] while a poll is in flight; observers read it between
//! polls. A oneshot stop channel makes the task cancellable on session
//! teardown without leaking the timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;

use reelgen_types::ReelgenError;
use reelgen_veo::{extract_artifact_url, Artifact, GenerationClient};

use crate::state::JobState;

/// Polling schedule: one query per interval, bounded attempts.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    /// 5 s × 60 attempts — a 5-minute ceiling.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Terminal outcome of a polling run.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The operation finished cleanly. `artifact` is `None` when the
    /// completion payload matched no known response variant.
    Completed { artifact: Option<Artifact> },
    /// The job failed: collaborator error flag, transport failure, or the
    /// attempt ceiling. The variant inside says which.
    Failed { error: ReelgenError },
}

/// Handle to a running polling task.
///
/// Dropping the handle stops the task: the stop channel closes and the
/// poller exits at its next wait, leaving the job as-is. Hold the handle
/// (or [`PollHandle::join`] it) for as long as polling should continue;
/// [`PollHandle::cancel`] stops it and waits for the wind-down.
pub struct PollHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<Option<PollOutcome>>,
}

impl PollHandle {
    /// Wait for the poller to reach a terminal outcome.
    /// `None` means the task was cancelled before one was observed.
    pub async fn join(self) -> Option<PollOutcome> {
        self.task.await.unwrap_or(None)
    }

    /// Signal the task to stop and wait for it to wind down. The job is
    /// left as-is (not failed): cancellation is session teardown, not an
    /// observed failure.
    pub async fn cancel(self) {
        let _ = self.stop_tx.send(());
        let _ = self.task.await;
    }
}

/// Drives one operation to a terminal status.
pub struct OperationPoller {
    generation: Arc<dyn GenerationClient>,
    config: PollConfig,
}

impl OperationPoller {
    pub fn new(generation: Arc<dyn GenerationClient>, config: PollConfig) -> Self {
        Self { generation, config }
    }

    /// Spawn the polling task over `state`. The task applies the terminal
    /// transition to `state` itself before resolving.
    pub fn spawn(&self, state: Arc<RwLock<JobState>>) -> PollHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let generation = self.generation.clone();
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            let operation = state.read().await.job().operation.clone();

            for attempt in 1..=config.max_attempts {
                tokio::select! {
                    _ = &mut stop_rx => {
                        tracing::debug!(%operation, attempt, "polling cancelled");
                        return None;
                    }
                    _ = tokio::time::sleep(config.interval) => {}
                }

                let status = match generation.job_status(&operation).await {
                    Ok(status) => status,
                    Err(e) => {
                        // transport failure is fatal in the current design
                        let error = ReelgenError::PollingTransport {
                            detail: e.to_string(),
                        };
                        let mut guard = state.write().await;
                        let _ = guard.fail(error.reason());
                        return Some(PollOutcome::Failed { error });
                    }
                };

                if !status.done {
                    tracing::debug!(%operation, attempt, "operation still running");
                    continue;
                }

                if let Some(error_payload) = status.error {
                    let error = ReelgenError::GenerationFailed {
                        detail: error_payload.to_string(),
                    };
                    let mut guard = state.write().await;
                    let _ = guard.fail(error.reason());
                    return Some(PollOutcome::Failed { error });
                }

                let artifact = status.response.as_ref().and_then(extract_artifact_url);
                let mut guard = state.write().await;
                let _ = guard.complete(artifact.as_ref().map(|a| a.url.clone()));
                return Some(PollOutcome::Completed { artifact });
            }

            let error = ReelgenError::PollingTimeout {
                attempts: config.max_attempts,
            };
            let mut guard = state.write().await;
            let _ = guard.fail(error.reason());
            Some(PollOutcome::Failed { error })
        });

        PollHandle { stop_tx, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelgen_types::{AgentId, Amount, Job, JobStatus, OperationName};
    use reelgen_veo::{GenerationParams, OperationStatus, VeoError};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted generation collaborator: pops one canned reply per query,
    /// repeating the last reply when the script runs dry.
    struct ScriptedGeneration {
        script: Mutex<VecDeque<Result<OperationStatus, String>>>,
        queries: AtomicU32,
    }

    impl ScriptedGeneration {
        fn new(script: Vec<Result<OperationStatus, String>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                queries: AtomicU32::new(0),
            })
        }

        fn queries(&self) -> u32 {
            self.queries.load(Ordering::SeqCst)
        }
    }

    fn not_done() -> Result<OperationStatus, String> {
        Ok(OperationStatus {
            done: false,
            error: None,
            response: None,
        })
    }

    fn done_with(response: serde_json::Value) -> Result<OperationStatus, String> {
        Ok(OperationStatus {
            done: true,
            error: None,
            response: Some(response),
        })
    }

    #[async_trait]
    impl GenerationClient for ScriptedGeneration {
        async fn start_job(
            &self,
            _prompt: &str,
            _model: &str,
            _params: &GenerationParams,
        ) -> Result<OperationName, VeoError> {
            Ok(OperationName::new("operations/scripted"))
        }

        async fn job_status(
            &self,
            _operation: &OperationName,
        ) -> Result<OperationStatus, VeoError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().expect("script lock");
            let reply = if script.len() > 1 {
                script.pop_front().expect("non-empty")
            } else {
                script.front().cloned().unwrap_or_else(not_done)
            };
            reply.map_err(|detail| VeoError::Http { detail })
        }
    }

    fn shared_state() -> Arc<RwLock<JobState>> {
        Arc::new(RwLock::new(JobState::new(Job::new(
            OperationName::new("operations/scripted"),
            "a cinematic car chase",
            AgentId::new("director"),
            "veo-3.1-fast-generate-preview",
            Amount::from_usdc(0.10),
        ))))
    }

    fn fast_config(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn completes_after_pending_polls_and_extracts_artifact() {
        let generation = ScriptedGeneration::new(vec![
            not_done(),
            not_done(),
            done_with(json!({
                "generateVideoResponse": {
                    "generatedSamples": [{ "uri": "https://video.example/done.mp4" }]
                }
            })),
        ]);
        let state = shared_state();
        let poller = OperationPoller::new(generation.clone(), fast_config(60));

        let outcome = poller.spawn(state.clone()).join().await.expect("terminal");
        match outcome {
            PollOutcome::Completed { artifact } => {
                let artifact = artifact.expect("known variant present");
                assert_eq!(artifact.url, "https://video.example/done.mp4");
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(generation.queries(), 3, "two pending polls plus the final one");

        let guard = state.read().await;
        assert_eq!(guard.status(), &JobStatus::Completed);
        assert_eq!(
            guard.job().artifact_url.as_deref(),
            Some("https://video.example/done.mp4")
        );
    }

    #[tokio::test]
    async fn times_out_after_exactly_max_attempts_queries() {
        let generation = ScriptedGeneration::new(vec![not_done()]);
        let state = shared_state();
        let poller = OperationPoller::new(generation.clone(), fast_config(60));

        let outcome = poller.spawn(state.clone()).join().await.expect("terminal");
        match outcome {
            PollOutcome::Failed { error } => {
                assert!(matches!(error, ReelgenError::PollingTimeout { attempts: 60 }));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(generation.queries(), 60, "exactly max_attempts queries");

        let guard = state.read().await;
        assert_eq!(guard.status(), &JobStatus::Failed);
        assert!(
            guard
                .job()
                .failure_reason
                .as_deref()
                .expect("reason attached")
                .contains("60"),
            "timeout reason names the attempt count"
        );
    }

    #[tokio::test]
    async fn transport_error_fails_immediately() {
        let generation = ScriptedGeneration::new(vec![
            not_done(),
            Err("connection reset by peer".into()),
            not_done(), // never reached
        ]);
        let state = shared_state();
        let poller = OperationPoller::new(generation.clone(), fast_config(60));

        let outcome = poller.spawn(state.clone()).join().await.expect("terminal");
        match outcome {
            PollOutcome::Failed { error } => {
                assert!(matches!(error, ReelgenError::PollingTransport { .. }));
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
        assert_eq!(generation.queries(), 2, "stops at the failing query");
        assert_eq!(state.read().await.status(), &JobStatus::Failed);
    }

    #[tokio::test]
    async fn done_with_error_flag_fails_the_job() {
        let generation = ScriptedGeneration::new(vec![Ok(OperationStatus {
            done: true,
            error: Some(json!({ "code": 13, "message": "generation error" })),
            response: None,
        })]);
        let state = shared_state();
        let poller = OperationPoller::new(generation, fast_config(60));

        let outcome = poller.spawn(state.clone()).join().await.expect("terminal");
        assert!(matches!(
            outcome,
            PollOutcome::Failed {
                error: ReelgenError::GenerationFailed { .. }
            }
        ));
        let guard = state.read().await;
        assert_eq!(guard.status(), &JobStatus::Failed);
        assert!(guard
            .job()
            .failure_reason
            .as_deref()
            .expect("reason")
            .contains("generation error"));
    }

    #[tokio::test]
    async fn completion_without_known_variant_still_completes() {
        let generation =
            ScriptedGeneration::new(vec![done_with(json!({ "unexpected": "shape" }))]);
        let state = shared_state();
        let poller = OperationPoller::new(generation, fast_config(60));

        let outcome = poller.spawn(state.clone()).join().await.expect("terminal");
        match outcome {
            PollOutcome::Completed { artifact } => assert!(artifact.is_none()),
            other => panic!("expected completion, got {other:?}"),
        }
        let guard = state.read().await;
        assert_eq!(guard.status(), &JobStatus::Completed);
        assert!(guard.job().artifact_url.is_none());
    }

    #[tokio::test]
    async fn cancel_stops_the_task_without_failing_the_job() {
        let generation = ScriptedGeneration::new(vec![not_done()]);
        let state = shared_state();
        let poller = OperationPoller::new(
            generation,
            PollConfig {
                interval: Duration::from_millis(5),
                max_attempts: 1000,
            },
        );

        let handle = poller.spawn(state.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel().await;

        // cancellation is teardown, not an observed failure
        assert_eq!(state.read().await.status(), &JobStatus::Generating);
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_polling() {
        let generation = ScriptedGeneration::new(vec![not_done()]);
        let state = shared_state();
        let poller = OperationPoller::new(
            generation.clone(),
            PollConfig {
                interval: Duration::from_millis(5),
                max_attempts: 1000,
            },
        );

        drop(poller.spawn(state.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        let after_drop = generation.queries();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            generation.queries(),
            after_drop,
            "no further queries once the handle is gone"
        );
        assert_eq!(state.read().await.status(), &JobStatus::Generating);
    }
}
