//! Custodial key vault for the shared agent wallet
//!
//! One secp256k1 keypair backs the whole process. The key comes from
//! `AGENT_WALLET_PRIVATE_KEY` when set; otherwise it is derived
//! deterministically (Keccak-256 of a fixed seed phrase) so that demo
//! deployments keep a stable address across restarts.
//!
//! The vault never exports raw private key bytes to callers.

use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use crate::client::ChainError;

/// Seed phrase for the deterministic demo key when no env key is configured
const DEMO_SEED_PHRASE: &str = "autonomous-ai-video-agents-base-sepolia";

/// A 20-byte Ethereum address, hex-encoded with 0x prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmAddress(pub String);

impl EvmAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive from a secp256k1 uncompressed public key (sans prefix byte).
    fn from_pubkey_bytes(uncompressed_no_prefix: &[u8]) -> Self {
        let hash = Keccak256::digest(uncompressed_no_prefix);
        let addr_bytes = &hash[12..]; // last 20 bytes
        EvmAddress(format!("0x{}", hex::encode(addr_bytes)))
    }
}

impl std::fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Custodial secp256k1 vault for the shared wallet
pub struct Vault {
    /// secp256k1 signing key (never exported)
    sk: SigningKey,
    /// Cached EVM address
    address: EvmAddress,
}

impl Vault {
    /// Create a vault from 32 bytes of key material.
    pub fn from_key_bytes(bytes: &[u8; 32]) -> Result<Self, ChainError> {
        let sk = SigningKey::from_bytes(bytes.into()).map_err(|e| ChainError::InvalidKey {
            detail: e.to_string(),
        })?;
        let vk = sk.verifying_key();
        let encoded = vk.to_encoded_point(false); // uncompressed
        let bytes = encoded.as_bytes();
        // bytes[0] == 0x04 (prefix), skip it
        let address = EvmAddress::from_pubkey_bytes(&bytes[1..]);
        Ok(Vault { sk, address })
    }

    /// Create a vault from a 0x-prefixed hex private key.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, ChainError> {
        let trimmed = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let raw = hex::decode(trimmed).map_err(|e| ChainError::InvalidKey {
            detail: format!("private key is not hex: {e}"),
        })?;
        let bytes: [u8; 32] = raw.try_into().map_err(|_| ChainError::InvalidKey {
            detail: "private key must be 32 bytes".into(),
        })?;
        Self::from_key_bytes(&bytes)
    }

    /// Create the process vault: `AGENT_WALLET_PRIVATE_KEY` if set,
    /// otherwise the deterministic demo key.
    pub fn from_env() -> Result<Self, ChainError> {
        match std::env::var("AGENT_WALLET_PRIVATE_KEY") {
            Ok(key) => Self::from_hex_key(&key),
            Err(_) => Self::demo(),
        }
    }

    /// Deterministic demo vault (stable address across runs).
    pub fn demo() -> Result<Self, ChainError> {
        let digest = Keccak256::digest(DEMO_SEED_PHRASE.as_bytes());
        let bytes: [u8; 32] = digest.into();
        Self::from_key_bytes(&bytes)
    }

    /// The wallet's EVM address.
    pub fn address(&self) -> &EvmAddress {
        &self.address
    }

    /// The verifying (public) key, for callers that need to hand the
    /// relay a key reference without touching private material.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.sk.verifying_key().to_encoded_point(true).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_address_is_0x_prefixed_42_chars() {
        let v = Vault::demo().expect("demo vault");
        assert!(v.address().as_str().starts_with("0x"));
        assert_eq!(v.address().as_str().len(), 42, "0x + 40 hex chars");
    }

    #[test]
    fn demo_vault_is_stable_across_calls() {
        let a = Vault::demo().expect("vault");
        let b = Vault::demo().expect("vault");
        assert_eq!(a.address(), b.address(), "same phrase, same address");
    }

    #[test]
    fn hex_key_accepts_0x_prefix() {
        let key = "0x".to_string() + &"11".repeat(32);
        let v = Vault::from_hex_key(&key).expect("valid key");
        assert!(v.address().as_str().starts_with("0x"));
    }

    #[test]
    fn bad_hex_key_is_rejected() {
        assert!(Vault::from_hex_key("0xnothex").is_err());
        assert!(Vault::from_hex_key("0x1234").is_err(), "too short");
    }

    #[test]
    fn different_keys_give_different_addresses() {
        let a = Vault::from_hex_key(&"11".repeat(32)).expect("vault");
        let b = Vault::from_hex_key(&"22".repeat(32)).expect("vault");
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn public_key_is_compressed_hex() {
        let v = Vault::demo().expect("vault");
        let pk = v.public_key_hex();
        assert_eq!(pk.len(), 66, "33 bytes compressed");
        assert!(pk.starts_with("02") || pk.starts_with("03"));
    }
}
