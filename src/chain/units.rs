//! Conversion between display amounts and integer base units.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::chain::types::{ChainError, ChainResult};

/// Satoshis per bitcoin-family coin.
pub const SATOSHI_DECIMALS: u32 = 8;

/// Wei per ether (and per BNB).
pub const ETHER_DECIMALS: u32 = 18;

/// Rust decimals carry at most 28 fractional digits.
const MAX_SCALE: u32 = 28;

/// Convert `amount` to base units with `decimals` fractional digits.
///
/// Rejects negative amounts and amounts finer than one base unit.
pub fn to_base_units(amount: Decimal, decimals: u32) -> ChainResult<U256> {
    if amount.is_sign_negative() {
        return Err(ChainError::InvalidAmount(format!("{} is negative", amount)));
    }
    if decimals > MAX_SCALE {
        return Err(ChainError::InvalidAmount(format!(
            "{} decimals is out of range",
            decimals
        )));
    }

    let mut scaled = amount;
    scaled.rescale(decimals);
    if scaled != amount || scaled.scale() != decimals {
        return Err(ChainError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            amount, decimals
        )));
    }

    // After rescale the mantissa is the amount in base units.
    let mantissa = scaled.mantissa();
    u128::try_from(mantissa)
        .map(U256::from)
        .map_err(|_| ChainError::InvalidAmount(amount.to_string()))
}

/// Convert base units to a display amount with `decimals` fractional digits.
pub fn from_base_units(value: U256, decimals: u32) -> ChainResult<Decimal> {
    let raw = u128::try_from(value)
        .ok()
        .and_then(|v| i128::try_from(v).ok())
        .ok_or_else(|| ChainError::InvalidAmount(format!("{} exceeds decimal range", value)))?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(|d| d.normalize())
        .map_err(|e| ChainError::InvalidAmount(e.to_string()))
}

pub fn satoshi_to_coin(satoshi: u64) -> Decimal {
    Decimal::new(satoshi as i64, SATOSHI_DECIMALS).normalize()
}

/// Numeric JSON parameter for node RPC calls, which expect floats.
pub fn amount_param(amount: Decimal) -> ChainResult<serde_json::Value> {
    let float = amount
        .to_f64()
        .ok_or_else(|| ChainError::InvalidAmount(amount.to_string()))?;
    serde_json::Number::from_f64(float)
        .map(serde_json::Value::Number)
        .ok_or_else(|| ChainError::InvalidAmount(amount.to_string()))
}
