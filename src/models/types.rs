//! Domain types for the access pipeline
//!
//! Nothing here outlives a request except `AccessThreshold`, which is built
//! once from configuration.

use alloy_primitives::U256;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::utils::constants::{token_scale, TOKEN_DECIMALS};

/// A syntactically valid `0x` + 40 hex account address.
///
/// Only obtainable through [`crate::core::address::validate_address`], so
/// holding one proves the check ran. Case is preserved as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvmAddress(String);

impl EvmAddress {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One balance lookup: which token, whose balance
#[derive(Debug, Clone)]
pub struct BalanceQuery {
    /// Token contract id (opaque to the pipeline)
    pub token_contract: String,
    pub holder: EvmAddress,
}

/// Minimum balance required for access.
///
/// Parsed from a non-negative decimal string of whole tokens and held
/// exactly in smallest units, so comparisons never go through floats.
/// Equality ignores the original spelling: "4" == "4.0".
#[derive(Debug, Clone)]
pub struct AccessThreshold {
    smallest_units: U256,
    display: String,
}

impl AccessThreshold {
    pub fn smallest_units(&self) -> U256 {
        self.smallest_units
    }
}

impl PartialEq for AccessThreshold {
    fn eq(&self, other: &Self) -> bool {
        self.smallest_units == other.smallest_units
    }
}

impl Eq for AccessThreshold {}

impl fmt::Display for AccessThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Why a threshold string was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdParseError {
    Empty,
    Negative,
    NotDecimal,
    TooManyDecimals,
    Overflow,
}

impl fmt::Display for ThresholdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "threshold is empty"),
            Self::Negative => write!(f, "threshold must be non-negative"),
            Self::NotDecimal => write!(f, "threshold is not a decimal number"),
            Self::TooManyDecimals => {
                write!(f, "threshold has more than {} fractional digits", TOKEN_DECIMALS)
            }
            Self::Overflow => write!(f, "threshold does not fit in 256 bits"),
        }
    }
}

impl std::error::Error for ThresholdParseError {}

impl FromStr for AccessThreshold {
    type Err = ThresholdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ThresholdParseError::Empty);
        }
        if s.starts_with('-') {
            return Err(ThresholdParseError::Negative);
        }
        let s = s.strip_prefix('+').unwrap_or(s);

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ThresholdParseError::NotDecimal);
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(ThresholdParseError::NotDecimal);
        }
        if frac_part.len() > TOKEN_DECIMALS as usize {
            return Err(ThresholdParseError::TooManyDecimals);
        }

        let parse = |digits: &str| -> Result<U256, ThresholdParseError> {
            if digits.is_empty() {
                return Ok(U256::ZERO);
            }
            U256::from_str_radix(digits, 10).map_err(|_| ThresholdParseError::Overflow)
        };

        let whole = parse(int_part)?
            .checked_mul(token_scale())
            .ok_or(ThresholdParseError::Overflow)?;

        // Right-pad fraction to 18 digits: "25" -> 250000000000000000
        let padded = format!("{:0<width$}", frac_part, width = TOKEN_DECIMALS as usize);
        let frac = if frac_part.is_empty() { U256::ZERO } else { parse(&padded)? };

        let smallest_units = whole
            .checked_add(frac)
            .ok_or(ThresholdParseError::Overflow)?;

        Ok(Self {
            smallest_units,
            display: s.to_string(),
        })
    }
}

/// Output of the pipeline. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessVerdict {
    pub granted: bool,
}
