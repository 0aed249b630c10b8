//! Job lifecycle types and payment records
//!
//! A [`Job`] tracks one long-running generation request from submission to a
//! terminal status. Jobs only come into existence after their payment: the
//! constructible starting state is [`JobStatus::Generating`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Amount;

/// Identifier of an agent in the fixed catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a long-running operation at the generation collaborator.
/// Reelgen never parses it; it is echoed back verbatim on every status query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationName(pub String);

impl OperationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a job in its lifecycle
///
/// Strictly one-directional:
/// `PendingPayment -> Generating -> {Completed, Failed}`.
/// `PendingPayment` exists only conceptually before payment — a Job object
/// is created in `Generating`. Terminal states admit no further transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Payment decision in flight; no Job object exists yet
    PendingPayment,
    /// Payment succeeded, generation running
    Generating,
    /// Terminal: artifact available
    Completed,
    /// Terminal: failed with a human-readable reason
    Failed,
}

impl JobStatus {
    /// Check whether this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check whether `next` is a permitted successor of `self`
    pub fn permits(&self, next: &JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::PendingPayment, Self::Generating)
                | (Self::Generating, Self::Completed)
                | (Self::Generating, Self::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PendingPayment => "pending_payment",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One tracked generation request
///
/// `status` (and the terminal `artifact_url` / `failure_reason` fields it
/// gates) is the only mutable state. The record is discarded with the
/// session; there is no persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Session-local record id
    pub id: Uuid,
    /// Opaque handle from the generation collaborator
    pub operation: OperationName,
    /// Originating prompt
    pub prompt: String,
    /// Owning agent
    pub agent_id: AgentId,
    /// Model identifier at the generation collaborator
    pub model: String,
    /// Quoted and paid cost (always equal — no partial payments)
    pub cost: Amount,
    /// Current lifecycle status
    pub status: JobStatus,
    /// Artifact reference, present only once Completed
    pub artifact_url: Option<String>,
    /// Human-readable reason, present only once Failed
    pub failure_reason: Option<String>,
    /// When the job was created (i.e. when payment succeeded)
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a job in `Generating`. Callers must hold a PaymentRecord
    /// before constructing one — a Job never exists before its payment.
    pub fn new(
        operation: OperationName,
        prompt: impl Into<String>,
        agent_id: AgentId,
        model: impl Into<String>,
        cost: Amount,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            prompt: prompt.into(),
            agent_id,
            model: model.into(),
            cost,
            status: JobStatus::Generating,
            artifact_url: None,
            failure_reason: None,
            created_at: Utc::now(),
        }
    }
}

/// Immutable audit record of one executed payment
///
/// Created exactly once per successful transfer, never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Amount actually transferred (equals the job's quoted cost)
    pub amount: Amount,
    /// Recipient address of the transfer
    pub recipient: String,
    /// On-chain transaction hash
    pub tx_hash: String,
    /// Block the transfer was confirmed in
    pub block_number: u64,
    /// Gas consumed by the transfer
    pub gas_used: u64,
    /// When confirmation was observed
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the shared custodial wallet
///
/// Every snapshot is a fresh read; callers must not cache one across a
/// payment decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    /// The single shared address
    pub address: String,
    /// Balance at read time
    pub balance: Amount,
    /// Network identifier (e.g. "Base Sepolia")
    pub network: String,
    /// Block-explorer URL for the address
    pub explorer_url: String,
    /// When the read happened
    pub last_updated: DateTime<Utc>,
}
