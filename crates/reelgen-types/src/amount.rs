//! Amount type with 6-decimal (micro-USDC) precision
//!
//! Reelgen prices jobs in USDC, which carries 6 decimals on-chain. Amounts
//! use fixed-point arithmetic over i128 so that balance comparisons and the
//! sufficiency decision never go through floating point.

use crate::{ReelgenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// USDC precision (6 decimals)
pub const USDC_DECIMALS: u8 = 6;

/// The multiplier for 6 decimals (1 USDC = 1_000_000 micro-USDC)
pub const USDC_MULTIPLIER: i128 = 1_000_000;

/// Fixed-point USDC amount
///
/// The raw value is in micro-USDC (smallest on-chain units). i128 leaves
/// ample headroom above the u256 values a balance read can realistically
/// return for a demo treasury, and supports negative values for ledger-style
/// debit views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    /// Raw value in micro-USDC
    pub micro: i128,
}

impl Amount {
    /// Create an amount from raw micro-USDC units
    pub fn from_micro(micro: i128) -> Self {
        Self { micro }
    }

    /// Create a zero amount
    pub fn zero() -> Self {
        Self { micro: 0 }
    }

    /// Create an amount from a human-readable USDC value (e.g. 0.10)
    pub fn from_usdc(usdc: f64) -> Self {
        Self {
            micro: (usdc * USDC_MULTIPLIER as f64).round() as i128,
        }
    }

    /// Get the human-readable USDC value
    pub fn to_usdc(&self) -> f64 {
        self.micro as f64 / USDC_MULTIPLIER as f64
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.micro == 0
    }

    /// Check if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.micro > 0
    }

    /// Checked addition
    pub fn checked_add(&self, other: Amount) -> Result<Amount> {
        self.micro
            .checked_add(other.micro)
            .map(Amount::from_micro)
            .ok_or(ReelgenError::AmountOverflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: Amount) -> Result<Amount> {
        self.micro
            .checked_sub(other.micro)
            .map(Amount::from_micro)
            .ok_or(ReelgenError::AmountOverflow)
    }

    /// Parse a raw on-chain balance with the token's own decimals into
    /// micro-USDC. Tokens with more than 6 decimals lose sub-micro dust.
    pub fn from_raw_units(raw: i128, decimals: u8) -> Result<Amount> {
        let micro = if decimals == USDC_DECIMALS {
            raw
        } else if decimals > USDC_DECIMALS {
            let divisor = 10i128
                .checked_pow((decimals - USDC_DECIMALS) as u32)
                .ok_or(ReelgenError::AmountOverflow)?;
            raw / divisor
        } else {
            let multiplier = 10i128
                .checked_pow((USDC_DECIMALS - decimals) as u32)
                .ok_or(ReelgenError::AmountOverflow)?;
            raw.checked_mul(multiplier)
                .ok_or(ReelgenError::AmountOverflow)?
        };
        Ok(Amount::from_micro(micro))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.micro < 0 { "-" } else { "" };
        let magnitude = self.micro.unsigned_abs();
        let whole = magnitude / USDC_MULTIPLIER as u128;
        let frac = magnitude % USDC_MULTIPLIER as u128;
        write!(f, "{}${}.{:02} USDC", sign, whole, frac / 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_usdc_round_trips() {
        let a = Amount::from_usdc(0.10);
        assert_eq!(a.micro, 100_000);
        assert!((a.to_usdc() - 0.10).abs() < 1e-9);
    }

    #[test]
    fn ordering_uses_raw_units() {
        assert!(Amount::from_usdc(0.05) < Amount::from_usdc(0.10));
        assert!(Amount::from_usdc(2.50) > Amount::zero());
    }

    #[test]
    fn checked_add_detects_overflow() {
        let max = Amount::from_micro(i128::MAX);
        assert!(matches!(
            max.checked_add(Amount::from_micro(1)),
            Err(ReelgenError::AmountOverflow)
        ));
    }

    #[test]
    fn checked_sub_allows_negative() {
        let a = Amount::from_usdc(0.05)
            .checked_sub(Amount::from_usdc(0.10))
            .expect("no overflow");
        assert!(a.micro < 0, "debit views may go negative");
    }

    #[test]
    fn raw_units_scale_down_from_18_decimals() {
        // 0.10 of an 18-decimal token
        let a = Amount::from_raw_units(100_000_000_000_000_000, 18).expect("scales");
        assert_eq!(a, Amount::from_usdc(0.10));
    }

    #[test]
    fn raw_units_pass_through_6_decimals() {
        let a = Amount::from_raw_units(100_000, 6).expect("identity");
        assert_eq!(a.micro, 100_000);
    }

    #[test]
    fn display_formats_usdc() {
        assert_eq!(Amount::from_usdc(0.10).to_string(), "$0.10 USDC");
        assert_eq!(Amount::from_usdc(2.50).to_string(), "$2.50 USDC");
    }

    #[test]
    fn display_keeps_sign_on_negative_sub_dollar_amounts() {
        assert_eq!(Amount::from_usdc(-0.05).to_string(), "-$0.05 USDC");
        assert_eq!(Amount::from_usdc(-2.50).to_string(), "-$2.50 USDC");
    }
}
