//! Reelgen Veo - the video-generation collaborator
//!
//! [`GenerationClient`] is the contract the orchestration core needs:
//! start a long-running job, query its status. [`VeoClient`] implements it
//! against the Veo `predictLongRunning` API.
//!
//! Completion payloads are opaque and their shape is not guaranteed; the
//! [`artifact`] module holds the ordered table of known response variants
//! used to pull the video URL out of one.

pub mod artifact;
pub mod client;

pub use artifact::{extract_artifact_url, Artifact, ARTIFACT_VARIANTS};
pub use client::{
    GenerationClient, GenerationParams, OperationStatus, VeoClient, VeoConfig, VeoError,
};
