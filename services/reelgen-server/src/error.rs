//! API error handling
//!
//! Every orchestration failure maps to one HTTP status and a JSON body of
//! the same shape the original service returned: `error`, `details`, and a
//! timestamp. Insufficient balance keeps its dedicated 402 with the
//! required/available pair and the wallet address.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use reelgen_types::{Amount, ReelgenError};

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Insufficient wallet balance")]
    InsufficientBalance {
        required: Amount,
        available: Amount,
        wallet_address: String,
        explorer_url: String,
    },

    #[error("Failed to check wallet balance")]
    WalletUnavailable { details: String },

    #[error("Autonomous payment failed")]
    PaymentFailed { details: String },

    #[error("Failed to start video generation")]
    SubmissionFailed { details: String },

    #[error("Failed to poll operation")]
    PollFailed { details: String },

    #[error("A job is already active")]
    JobAlreadyActive,

    #[error("Failed to download video")]
    DownloadFailed { details: String },
}

impl ApiError {
    /// Translate a core error, attaching wallet display fields where the
    /// response shape needs them.
    pub fn from_core(err: ReelgenError, wallet_address: &str, explorer_url: &str) -> Self {
        match err {
            ReelgenError::InsufficientBalance {
                required,
                available,
            } => ApiError::InsufficientBalance {
                required,
                available,
                wallet_address: wallet_address.to_string(),
                explorer_url: explorer_url.to_string(),
            },
            ReelgenError::BalanceUnavailable { detail } => {
                ApiError::WalletUnavailable { details: detail }
            }
            ReelgenError::PaymentExecution { detail } => {
                ApiError::PaymentFailed { details: detail }
            }
            ReelgenError::Submission { detail } => ApiError::SubmissionFailed { details: detail },
            ReelgenError::JobAlreadyActive => ApiError::JobAlreadyActive,
            other => ApiError::PaymentFailed {
                details: other.to_string(),
            },
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::JobAlreadyActive => StatusCode::CONFLICT,
            ApiError::WalletUnavailable { .. }
            | ApiError::PollFailed { .. }
            | ApiError::SubmissionFailed { .. }
            | ApiError::DownloadFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::PaymentFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InsufficientBalance {
                required,
                available,
                wallet_address,
                explorer_url,
            } => json!({
                "error": "Insufficient wallet balance",
                "details": format!(
                    "Shared wallet has {available} but needs {required}"
                ),
                "walletBalance": available.to_usdc(),
                "requiredAmount": required.to_usdc(),
                "walletAddress": wallet_address,
                "explorerUrl": explorer_url,
                "timestamp": Utc::now(),
            }),
            ApiError::BadRequest(details) => json!({
                "error": self.to_string(),
                "details": details,
                "timestamp": Utc::now(),
            }),
            ApiError::WalletUnavailable { details }
            | ApiError::PaymentFailed { details }
            | ApiError::SubmissionFailed { details }
            | ApiError::PollFailed { details }
            | ApiError::DownloadFailed { details } => json!({
                "error": self.to_string(),
                "details": details,
                "timestamp": Utc::now(),
            }),
            ApiError::JobAlreadyActive => json!({
                "error": self.to_string(),
                "details": "finish or cancel the current job before starting another",
                "timestamp": Utc::now(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
