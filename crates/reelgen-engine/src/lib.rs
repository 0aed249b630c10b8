//! Reelgen Engine - the orchestration core
//!
//! Drives one video request end to end:
//!
//! 1. [`reelgen_agents::select_agent`] picks the representing agent
//! 2. [`reelgen_wallet::WalletGateway`] makes the payment decision and
//!    executes the transfer
//! 3. [`JobSubmitter`] starts the generation job (strictly after payment)
//! 4. [`OperationPoller`] drives the job to a terminal status on a bounded,
//!    cancellable schedule
//!
//! The current job travels as an explicit [`JobContext`] — there is no
//! global "current job" anywhere.

pub mod orchestrator;
pub mod poller;
pub mod state;
pub mod submit;

pub use orchestrator::{JobContext, Orchestrator, OrchestratorConfig};
pub use poller::{OperationPoller, PollConfig, PollHandle, PollOutcome};
pub use state::JobState;
pub use submit::JobSubmitter;
