//! Reelgen Agents - Reference agent catalog and selection
//!
//! Five named agent personas route incoming prompts. An agent is a routing
//! and attribution identity, not an execution thread: it lends its name to
//! the payment and the chat messaging around a job.
//!
//! Selection is pure and deterministic: identical prompts always pick the
//! same agent, and a prompt matching no keywords falls through to an
//! explicit default variant rather than an implicit branch.

pub mod catalog;
pub mod selector;

pub use catalog::{Agent, Catalog};
pub use selector::{select_agent, Selection};
