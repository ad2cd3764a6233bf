//! Conversion between display amounts and base units
//!
//! Both SUI and WAL are handled with 9 decimal places. The WAL precision is
//! assumed to match SUI and has not been checked against the coin metadata.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::SwapError;

/// Decimal places shared by SUI and WAL
pub const COIN_DECIMALS: u32 = 9;

/// 1 SUI = 1_000_000_000 MIST
pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Decimal places shown for derived amounts
pub const DISPLAY_DECIMALS: u32 = 4;

/// Convert a positive display amount into base units.
///
/// Digits beyond the ninth decimal place are truncated. Zero, negative and
/// overflowing amounts are rejected.
pub fn to_base_units(amount: Decimal) -> Result<u64, SwapError> {
    if amount <= Decimal::ZERO {
        return Err(SwapError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }

    let base = amount
        .checked_mul(Decimal::from(MIST_PER_SUI))
        .ok_or_else(|| SwapError::InvalidAmount(format!("amount {} is too large", amount)))?
        .trunc()
        .to_u64()
        .ok_or_else(|| SwapError::InvalidAmount(format!("amount {} is too large", amount)))?;

    if base == 0 {
        return Err(SwapError::InvalidAmount(format!(
            "amount {} is below one base unit",
            amount
        )));
    }

    Ok(base)
}

/// Convert base units back into a display amount
pub fn from_base_units(base: u64) -> Decimal {
    Decimal::from_i128_with_scale(base as i128, COIN_DECIMALS).normalize()
}

/// Round a derived amount for display (half away from zero)
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse user-entered amount text. Empty input means "no amount".
pub fn parse_amount(input: &str) -> Result<Option<Decimal>, SwapError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let amount = Decimal::from_str(trimmed)
        .map_err(|e| SwapError::InvalidAmount(format!("'{}': {}", trimmed, e)))?;

    if amount.is_sign_negative() {
        return Err(SwapError::InvalidAmount(format!(
            "amount must not be negative, got {}",
            trimmed
        )));
    }

    Ok(Some(amount))
}
