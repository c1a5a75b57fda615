//! Holder address syntax check: `^0x[0-9a-fA-F]{40}$`, full-string match.

use crate::models::errors::{AppError, AppResult};
use crate::models::types::EvmAddress;

const ADDRESS_HEX_LEN: usize = 40;

/// True when `input` is exactly `0x` followed by 40 hex digits
#[inline]
pub fn is_valid_address(input: &str) -> bool {
    match input.strip_prefix("0x") {
        Some(hex) => hex.len() == ADDRESS_HEX_LEN && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Validate untrusted input into an [`EvmAddress`]
pub fn validate_address(input: &str) -> AppResult<EvmAddress> {
    if is_valid_address(input) {
        Ok(EvmAddress::new_unchecked(input.to_string()))
    } else {
        Err(AppError::invalid_address("Invalid address"))
    }
}
