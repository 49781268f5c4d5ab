//! Conversion between human decimal strings and on-chain base units
//!
//! ERC-20 amounts travel as `uint256` base units; users type and read decimal
//! strings. Formatting trims trailing zeros but always keeps one fractional
//! digit, so `1_250_000` at 6 decimals renders as `1.25` and `5_000_000` as
//! `5.0`.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::UnitsError;

/// Parse a human decimal string into base units
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, UnitsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(UnitsError::InvalidNumber(value.to_string()));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return Err(UnitsError::InvalidNumber(value.to_string()));
    }

    let decimals = decimals as usize;
    let frac_part = if frac_part.len() > decimals {
        // Excess digits are only tolerated when they are zeros
        let (kept, excess) = frac_part.split_at(decimals);
        if excess.bytes().any(|b| b != b'0') {
            return Err(UnitsError::TooManyDecimals {
                value: value.to_string(),
                decimals: decimals as u8,
            });
        }
        kept
    } else {
        frac_part
    };

    let mut digits = String::with_capacity(int_part.len() + decimals);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.extend(std::iter::repeat('0').take(decimals - frac_part.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow(value.to_string()))
}

/// Format base units as a human decimal string
pub fn format_units(value: U256, decimals: u8) -> String {
    let decimals = decimals as usize;
    let mut digits = value.to_string();
    if digits.len() <= decimals {
        let padding = "0".repeat(decimals + 1 - digits.len());
        digits.insert_str(0, &padding);
    }

    let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}.0", int_part)
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Base units as a `Decimal`, for arithmetic on human amounts
pub fn to_decimal(value: U256, decimals: u8) -> Result<Decimal, UnitsError> {
    let formatted = format_units(value, decimals);
    Decimal::from_str(&formatted).map_err(|_| UnitsError::DecimalRange(formatted))
}
