//! Reelgen Chain - the blockchain collaborator
//!
//! Two concerns live here, both deliberately thin:
//!
//! - [`Vault`]: derives the shared custodial wallet's secp256k1 key and
//!   EVM address, deterministically when no key is configured.
//! - [`ChainClient`]: the collaborator contract the payment layer needs —
//!   `read_balance` and `transfer`. The HTTP implementation reads ERC-20
//!   balances over plain JSON-RPC `eth_call` and delegates transfer
//!   broadcast to a signer relay; transaction signing and wire semantics
//!   stay outside this crate.
//!
//! Errors surface as [`ChainError`]; the wallet layer translates them into
//! the caller-facing taxonomy.

pub mod client;
pub mod vault;

pub use client::{ChainClient, ChainConfig, ChainError, HttpChainClient, TransferReceipt};
pub use vault::{EvmAddress, Vault};
