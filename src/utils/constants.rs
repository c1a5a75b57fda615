//! Constants Module - Single Source of Truth
//!
//! Every default, fixed oracle parameter and unit conversion lives here.
//! No hardcoded values in other modules.

use alloy_primitives::U256;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "HolderGate";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound oracle requests
pub const USER_AGENT: &str = concat!("HolderGate/", env!("CARGO_PKG_VERSION"));

// ============================================
// ORACLE CONSTANTS
// ============================================

/// Default BscScan-compatible endpoint
pub const DEFAULT_ORACLE_BASE_URL: &str = "https://api.bscscan.com/api";

/// Default deadline for one oracle call (seconds)
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 5;

/// Fixed query selector: token balance lookup
pub const ORACLE_MODULE: &str = "account";
pub const ORACLE_ACTION: &str = "tokenbalance";
pub const ORACLE_TAG: &str = "latest";

/// Status flag the oracle uses for success
pub const ORACLE_STATUS_OK: &str = "1";

// ============================================
// TOKEN UNITS
// ============================================

/// Implied decimals of the smallest-unit balance
pub const TOKEN_DECIMALS: u8 = 18;

/// 10^18 as U256
pub fn token_scale() -> U256 {
    U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

/// Lossy smallest-unit -> whole-token conversion (display/logging only)
pub fn to_whole_tokens(raw: U256) -> f64 {
    f64::from(raw) / 1e18
}

// ============================================
// THROTTLE / SERVER DEFAULTS
// ============================================

/// Default throttle window: 15 minutes
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

/// Default requests per window per caller
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// How often stale throttle entries are evicted
pub const THROTTLE_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 3000;

// ============================================
// ENVIRONMENT KEYS
// ============================================

pub const ENV_API_KEY: &str = "BSCSCAN_API_KEY";
pub const ENV_CONTRACT_ADDRESS: &str = "CONTRACT_ADDRESS";
pub const ENV_MIN_BALANCE: &str = "MIN_BALANCE";
pub const ENV_ORACLE_BASE_URL: &str = "ORACLE_BASE_URL";
pub const ENV_ORACLE_TIMEOUT_SECS: &str = "ORACLE_TIMEOUT_SECS";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";
pub const ENV_RATE_LIMIT_MAX_REQUESTS: &str = "RATE_LIMIT_MAX_REQUESTS";
pub const ENV_TRUST_PROXY: &str = "TRUST_PROXY";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_scale() {
        assert_eq!(token_scale(), U256::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_to_whole_tokens() {
        let five = U256::from(5_000_000_000_000_000_000u128);
        assert_eq!(to_whole_tokens(five), 5.0);
        assert_eq!(to_whole_tokens(U256::ZERO), 0.0);
        assert_eq!(to_whole_tokens(U256::from(1_500_000_000_000_000_000u128)), 1.5);
        assert!(to_whole_tokens(U256::MAX).is_finite());
    }
}
