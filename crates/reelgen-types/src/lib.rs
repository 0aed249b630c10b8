//! Reelgen Types - Foundation types for agent video orchestration
//!
//! This crate has zero dependencies on other reelgen crates and defines:
//!
//! - [`Amount`]: fixed-point micro-USDC amounts with checked arithmetic
//! - [`JobStatus`] / [`Job`]: the one-directional job lifecycle
//! - [`PaymentRecord`]: the immutable audit record of an executed payment
//! - [`ReelgenError`]: the full failure taxonomy (Invariant: failure is
//!   explicit — no error is ever conflated with an empty success value)

pub mod amount;
pub mod error;
pub mod job;

pub use amount::*;
pub use error::*;
pub use job::*;
