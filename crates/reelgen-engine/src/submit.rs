//! Job submission
//!
//! Thin pass-through to the generation collaborator. Submission happens
//! strictly after payment succeeds, so a rejection here is surfaced
//! immediately and distinctly — funds have already moved.

use std::sync::Arc;

use reelgen_types::{OperationName, ReelgenError, Result};
use reelgen_veo::{GenerationClient, GenerationParams};

/// Starts generation jobs. No retries, no queueing.
pub struct JobSubmitter {
    generation: Arc<dyn GenerationClient>,
}

impl JobSubmitter {
    pub fn new(generation: Arc<dyn GenerationClient>) -> Self {
        Self { generation }
    }

    /// Ask the collaborator to start a job, returning its opaque handle.
    pub async fn submit(
        &self,
        prompt: &str,
        model: &str,
        params: &GenerationParams,
    ) -> Result<OperationName> {
        self.generation
            .start_job(prompt, model, params)
            .await
            .map_err(|e| ReelgenError::Submission {
                detail: e.to_string(),
            })
    }
}
