//! Veo generation client
//!
//! `predictLongRunning` starts a job and returns an opaque operation name;
//! a GET on that name reports `{done, error?, response?}`. The response
//! object stays opaque here — see [`crate::artifact`] for extraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use reelgen_types::OperationName;

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum VeoError {
    #[error("generation API key not configured (GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("generation request failed: {detail}")]
    Http { detail: String },

    #[error("generation API rejected the request: {status} - {detail}")]
    Rejected { status: u16, detail: String },

    #[error("could not decode generation response: {detail}")]
    Decode { detail: String },
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Status of a long-running operation as the collaborator reports it
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStatus {
    /// Whether the operation reached a terminal state
    pub done: bool,
    /// Error payload, present when the operation failed
    pub error: Option<Value>,
    /// Opaque completion payload, present on clean completion
    pub response: Option<Value>,
}

/// Generation knobs forwarded verbatim to the collaborator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub aspect_ratio: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// The generation collaborator the orchestration core talks to
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Start a long-running generation job. No retries: submission happens
    /// strictly after payment, so a rejection must surface immediately.
    async fn start_job(
        &self,
        prompt: &str,
        model: &str,
        params: &GenerationParams,
    ) -> Result<OperationName, VeoError>;

    /// One status query for the given operation.
    async fn job_status(&self, operation: &OperationName) -> Result<OperationStatus, VeoError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────────

/// Configuration for [`VeoClient`]
#[derive(Debug, Clone)]
pub struct VeoConfig {
    pub base_url: String,
    pub api_key: String,
}

impl VeoConfig {
    /// Read configuration from the environment. Fails when no API key is
    /// set — a missing key must not turn into a runtime 401 mid-flow.
    pub fn from_env() -> Result<Self, VeoError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| VeoError::MissingApiKey)?;
        Ok(Self {
            base_url: std::env::var("REELGEN_VEO_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            api_key,
        })
    }
}

/// Veo `predictLongRunning` HTTP client
pub struct VeoClient {
    config: VeoConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: &'a GenerationParams,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    name: String,
}

#[derive(Deserialize)]
struct OperationResponse {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    response: Option<Value>,
}

impl VeoClient {
    pub fn new(config: VeoConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, VeoError> {
        Ok(Self::new(VeoConfig::from_env()?))
    }
}

#[async_trait]
impl GenerationClient for VeoClient {
    async fn start_job(
        &self,
        prompt: &str,
        model: &str,
        params: &GenerationParams,
    ) -> Result<OperationName, VeoError> {
        let url = format!("{}/models/{}:predictLongRunning", self.config.base_url, model);
        let body = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: params,
        };

        tracing::info!(%model, "starting video generation");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VeoError::Http {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(VeoError::Rejected { status, detail });
        }

        let started: PredictResponse = response.json().await.map_err(|e| VeoError::Decode {
            detail: e.to_string(),
        })?;

        tracing::info!(operation = %started.name, "generation operation started");
        Ok(OperationName::new(started.name))
    }

    async fn job_status(&self, operation: &OperationName) -> Result<OperationStatus, VeoError> {
        let url = format!("{}/{}", self.config.base_url, operation.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| VeoError::Http {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(VeoError::Rejected { status, detail });
        }

        let op: OperationResponse = response.json().await.map_err(|e| VeoError::Decode {
            detail: e.to_string(),
        })?;

        tracing::debug!(operation = %operation, done = op.done, "polled operation status");
        Ok(OperationStatus {
            done: op.done,
            error: op.error,
            response: op.response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn predict_request_serializes_to_api_shape() {
        let params = GenerationParams::default();
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: "a cinematic car chase",
            }],
            parameters: &params,
        };
        let value = serde_json::to_value(&body).expect("serializes");
        assert_eq!(value["instances"][0]["prompt"], "a cinematic car chase");
        assert_eq!(value["parameters"]["aspectRatio"], "16:9");
    }

    #[test]
    fn operation_response_defaults_missing_fields() {
        let op: OperationResponse =
            serde_json::from_value(json!({ "name": "operations/abc" })).expect("parses");
        assert!(!op.done, "absent done means still running");
        assert!(op.error.is_none());
        assert!(op.response.is_none());
    }

    #[test]
    fn operation_response_carries_error_payload() {
        let op: OperationResponse = serde_json::from_value(json!({
            "done": true,
            "error": { "code": 13, "message": "internal" }
        }))
        .expect("parses");
        assert!(op.done);
        assert_eq!(op.error.expect("error present")["code"], 13);
    }
}
