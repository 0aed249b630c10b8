//! Error types for Reelgen
//!
//! Every failure in the orchestration flow maps to exactly one variant here.
//! All variants are terminal for the current request: the caller must
//! re-initiate selection and payment from scratch, never retry in place.

use crate::{Amount, JobStatus};
use thiserror::Error;

/// Result type for Reelgen operations
pub type Result<T> = std::result::Result<T, ReelgenError>;

/// Reelgen error taxonomy
#[derive(Debug, Clone, Error)]
pub enum ReelgenError {
    // ========================================================================
    // Amount Errors
    // ========================================================================

    /// Amount overflow during arithmetic
    #[error("Amount overflow during arithmetic operation")]
    AmountOverflow,

    // ========================================================================
    // Wallet Errors
    // ========================================================================

    /// The shared wallet cannot cover the quoted cost. No transfer was
    /// attempted; this variant has no side effect.
    #[error("Insufficient wallet balance: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    /// The balance read itself failed. Distinct from a zero balance:
    /// a failed read must never be reported as "no funds".
    #[error("Wallet balance unavailable: {detail}")]
    BalanceUnavailable { detail: String },

    /// The transfer was rejected or confirmation could not be obtained.
    /// No PaymentRecord exists and no Job may be created. Never retried
    /// automatically: a blind retry could double-charge the shared wallet.
    #[error("Payment execution failed: {detail}")]
    PaymentExecution { detail: String },

    // ========================================================================
    // Generation Errors
    // ========================================================================

    /// The generation collaborator rejected the submission. Surfaced
    /// distinctly because by this point funds have already moved.
    #[error("Job submission failed after payment: {detail}")]
    Submission { detail: String },

    /// The poll ceiling was reached before a terminal status was observed
    #[error("Polling timed out after {attempts} attempts")]
    PollingTimeout { attempts: u32 },

    /// A status query failed at the transport level. Fatal in the current
    /// design; kept distinct from PollingTimeout so a bounded-retry policy
    /// can be introduced without re-classifying errors.
    #[error("Polling transport failure: {detail}")]
    PollingTransport { detail: String },

    /// The generation collaborator reported the job done with an error flag
    #[error("Generation failed: {detail}")]
    GenerationFailed { detail: String },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================

    /// Attempted a job status transition the lifecycle does not permit
    #[error("Invalid job transition: {from:?} -> {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// A second job was requested while one is still active in this session
    #[error("A job is already active in this session")]
    JobAlreadyActive,
}

impl ReelgenError {
    /// Human-readable reason attached to a failed Job
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_reports_both_amounts() {
        let err = ReelgenError::InsufficientBalance {
            required: Amount::from_usdc(0.10),
            available: Amount::from_usdc(0.05),
        };
        let msg = err.to_string();
        assert!(msg.contains("$0.10"), "must name the required amount: {msg}");
        assert!(msg.contains("$0.05"), "must name the available amount: {msg}");
    }

    #[test]
    fn balance_unavailable_is_not_zero_balance() {
        let err = ReelgenError::BalanceUnavailable {
            detail: "rpc timeout".into(),
        };
        assert!(!err.to_string().contains("0.00"));
        assert!(err.to_string().contains("rpc timeout"));
    }
}
