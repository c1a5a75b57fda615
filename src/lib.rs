//! HolderGate Library
//!
//! Grants or denies access based on whether an address holds at least a
//! configured minimum balance of a token, as reported by a BscScan-compatible
//! indexing API:
//! - Address syntax validation
//! - Single-shot balance lookup against the oracle
//! - Threshold decision in exact smallest units
//! - Per-caller request throttling
//!
//! Module layout:
//! - `core/`: decision pipeline (validation, decision, throttle, verifier)
//! - `providers/`: balance oracle seam and the BscScan client
//! - `models/`: domain types, configuration, errors
//! - `utils/`: constants, telemetry
//! - `api/`: axum HTTP surface

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use api::{create_router, start_cleanup_task, AppState};
pub use crate::core::{
    decide, normalize_balance, validate_address, AccessVerifier, RateLimiter, RequestThrottle,
    ThrottleDecision,
};
pub use models::{
    AccessThreshold, AccessVerdict, AppError, AppResult, BalanceQuery, ErrorCode, EvmAddress,
    GateConfig, OracleConfig, RateLimitConfig,
};
pub use providers::{BalanceOracle, BscScanClient};
pub use utils::{TelemetryCollector, TelemetryStats};
