//! Access decision: raw smallest-unit balance vs. configured threshold.
//!
//! The comparison is done on U256 smallest units. Ties grant access.

use alloy_primitives::U256;

use crate::models::types::{AccessThreshold, AccessVerdict};
use crate::utils::constants::to_whole_tokens;

/// Decide whether `raw` meets `threshold`
#[inline]
pub fn decide(raw: U256, threshold: &AccessThreshold) -> AccessVerdict {
    AccessVerdict {
        granted: raw >= threshold.smallest_units(),
    }
}

/// Whole-token balance, for logs
#[inline]
pub fn normalize_balance(raw: U256) -> f64 {
    to_whole_tokens(raw)
}
