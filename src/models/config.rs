//! Configuration module for HolderGate
//!
//! Read once at startup, immutable afterwards. Missing oracle credentials or
//! contract id are startup-fatal.
//! Uses constants from utils/constants.rs

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use super::errors::{AppError, AppResult};
use super::types::AccessThreshold;
use crate::core::address::is_valid_address;
use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_ORACLE_BASE_URL, DEFAULT_ORACLE_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS, ENV_API_KEY,
    ENV_CONTRACT_ADDRESS, ENV_HOST, ENV_MIN_BALANCE, ENV_ORACLE_BASE_URL,
    ENV_ORACLE_TIMEOUT_SECS, ENV_PORT, ENV_RATE_LIMIT_MAX_REQUESTS,
    ENV_RATE_LIMIT_WINDOW_SECS, ENV_TRUST_PROXY,
};

/// Oracle connection settings
#[derive(Clone)]
pub struct OracleConfig {
    pub base_url: String,
    /// Never logged
    pub api_key: String,
    pub timeout: Duration,
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window_duration: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

/// Whole-process configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub oracle: OracleConfig,
    /// Token contract id sent to the oracle
    pub contract_address: String,
    pub min_balance: AccessThreshold,
    pub rate_limit: RateLimitConfig,
    /// Key throttling on X-Forwarded-For instead of the peer address
    pub trust_proxy: bool,
    pub host: String,
    pub port: u16,
}

impl GateConfig {
    /// Load from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| AppError::missing_env(key));

        let api_key = required(ENV_API_KEY)?;
        let contract_address = required(ENV_CONTRACT_ADDRESS)?;
        let min_balance = required(ENV_MIN_BALANCE)?
            .parse::<AccessThreshold>()
            .map_err(|e| AppError::invalid_config(ENV_MIN_BALANCE, e))?;

        if !is_valid_address(&contract_address) {
            warn!(
                contract = %contract_address,
                "CONTRACT_ADDRESS is not a 0x-prefixed 40-hex address; passing it to the oracle as-is"
            );
        }

        let base_url = get(ENV_ORACLE_BASE_URL).unwrap_or_else(|| DEFAULT_ORACLE_BASE_URL.to_string());
        let timeout_secs: u64 = parse_or(&get, ENV_ORACLE_TIMEOUT_SECS, DEFAULT_ORACLE_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(AppError::invalid_config(ENV_ORACLE_TIMEOUT_SECS, "must be at least 1"));
        }

        let window_secs: u64 =
            parse_or(&get, ENV_RATE_LIMIT_WINDOW_SECS, DEFAULT_RATE_LIMIT_WINDOW_SECS)?;
        if window_secs == 0 {
            return Err(AppError::invalid_config(ENV_RATE_LIMIT_WINDOW_SECS, "must be at least 1"));
        }
        let requests_per_window: u32 =
            parse_or(&get, ENV_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_MAX_REQUESTS)?;

        let trust_proxy = match get(ENV_TRUST_PROXY) {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| AppError::invalid_config(ENV_TRUST_PROXY, v))?,
        };

        let host = get(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(&get, ENV_PORT, DEFAULT_PORT)?;

        info!("🔑 {} configured (key hidden for security)", ENV_API_KEY);

        Ok(Self {
            oracle: OracleConfig {
                base_url,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            contract_address,
            min_balance,
            rate_limit: RateLimitConfig {
                requests_per_window,
                window_duration: Duration::from_secs(window_secs),
            },
            trust_proxy,
            host,
            port,
        })
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::invalid_config(ENV_HOST, e))
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e| AppError::invalid_config(key, e)),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
