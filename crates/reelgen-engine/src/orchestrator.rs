//! End-to-end orchestration
//!
//! `agent selection -> payment -> submission -> polling`, with the current
//! job carried in an explicit [`JobContext`]. One job per session: the
//! design gives the single shared wallet no way to race two payments
//! against one balance read.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use reelgen_agents::{select_agent, Agent, Catalog, Selection};
use reelgen_types::{Amount, Job, PaymentRecord, ReelgenError, Result};
use reelgen_veo::{GenerationClient, GenerationParams};
use reelgen_wallet::WalletGateway;

use crate::poller::{OperationPoller, PollConfig, PollHandle};
use crate::state::JobState;
use crate::submit::JobSubmitter;

/// Orchestration parameters
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model identifier at the generation collaborator
    pub model: String,
    /// Quoted cost per job; the payment always equals this exactly
    pub cost: Amount,
    /// Generation knobs forwarded verbatim
    pub params: GenerationParams,
    /// Polling schedule
    pub poll: PollConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: "veo-3.1-fast-generate-preview".to_string(),
            cost: Amount::from_usdc(0.10),
            params: GenerationParams::default(),
            poll: PollConfig::default(),
        }
    }
}

/// Everything one orchestrated job carries: the representing agent, the
/// proof of payment, and the shared job record. Passed to and returned
/// from orchestration calls — never stored globally.
#[derive(Debug)]
pub struct JobContext {
    pub agent: Agent,
    /// Keyword match score (zero when the default agent was routed)
    pub selection_score: usize,
    /// The immutable audit record; exists strictly before the Job
    pub payment: PaymentRecord,
    /// The job record, readable between polls
    pub state: Arc<RwLock<JobState>>,
}

impl JobContext {
    /// Snapshot of the current job record.
    pub async fn job(&self) -> Job {
        self.state.read().await.job().clone()
    }
}

/// Drives requests through selection, payment, submission, and polling.
pub struct Orchestrator {
    catalog: Catalog,
    wallet: Arc<WalletGateway>,
    generation: Arc<dyn GenerationClient>,
    config: OrchestratorConfig,
    /// The session's active job, if any. Checked before any payment.
    active: Mutex<Option<Arc<RwLock<JobState>>>>,
}

impl Orchestrator {
    pub fn new(
        catalog: Catalog,
        wallet: Arc<WalletGateway>,
        generation: Arc<dyn GenerationClient>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            catalog,
            wallet,
            generation,
            config,
            active: Mutex::new(None),
        }
    }

    /// Pick the representing agent for a prompt.
    pub fn select(&self, prompt: &str) -> Selection<'_> {
        select_agent(&self.catalog, prompt)
    }

    /// The agent catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run selection, payment, and submission, leaving the job in
    /// `Generating`. The caller decides how to drive polling: call
    /// [`Orchestrator::poll_to_completion`], or query status externally.
    ///
    /// Failure order matters and is load-bearing:
    /// - active job -> `JobAlreadyActive`, nothing else happens
    /// - insufficient/unreadable balance -> no transfer, no job
    /// - transfer failure -> no job
    /// - submission failure -> surfaced distinctly, funds already moved
    pub async fn start(&self, prompt: &str) -> Result<JobContext> {
        let mut active = self.active.lock().await;
        if let Some(state) = active.as_ref() {
            if !state.read().await.is_terminal() {
                return Err(ReelgenError::JobAlreadyActive);
            }
        }

        let selection = self.select(prompt);
        let agent = selection.agent().clone();
        let selection_score = selection.score();
        tracing::info!(
            agent = %agent.id,
            score = selection_score,
            "agent selected for prompt"
        );

        // fresh read + sufficiency decision + at most one transfer
        let payment = self.wallet.charge(self.config.cost).await?;

        let submitter = JobSubmitter::new(self.generation.clone());
        let operation = submitter
            .submit(prompt, &self.config.model, &self.config.params)
            .await?;

        let job = Job::new(
            operation,
            prompt,
            agent.id.clone(),
            self.config.model.clone(),
            self.config.cost,
        );
        let state = Arc::new(RwLock::new(JobState::new(job)));
        *active = Some(state.clone());

        Ok(JobContext {
            agent,
            selection_score,
            payment,
            state,
        })
    }

    /// Spawn the bounded poller over a started job.
    pub fn spawn_poller(&self, context: &JobContext) -> PollHandle {
        OperationPoller::new(self.generation.clone(), self.config.poll.clone())
            .spawn(context.state.clone())
    }

    /// Full flow: [`Orchestrator::start`], then poll until terminal.
    /// Every created job ends `Completed` or `Failed` with a reason.
    pub async fn run(&self, prompt: &str) -> Result<JobContext> {
        let context = self.start(prompt).await?;
        let handle = self.spawn_poller(&context);
        let _ = handle.join().await;
        Ok(context)
    }

    /// Discard the session's job record on teardown. A running poll is
    /// cancelled through its [`PollHandle`]; this only forgets the record.
    pub async fn clear_session(&self) {
        let mut active = self.active.lock().await;
        *active = None;
    }
}
