//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::errors::{AppError, ErrorCode};
use crate::utils::telemetry::TelemetryStats;

/// Caller-facing message for every oracle-side failure
pub const VERIFICATION_UNAVAILABLE_MESSAGE: &str = "Unable to verify balance";

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_address() -> Self {
        Self {
            code: "INVALID_ADDRESS".to_string(),
            message: "Invalid address".to_string(),
            details: Some("address must be 0x followed by 40 hex characters".to_string()),
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }

    /// Uniform oracle failure: internal cause is never exposed
    pub fn verification_unavailable() -> Self {
        Self {
            code: "VERIFICATION_UNAVAILABLE".to_string(),
            message: VERIFICATION_UNAVAILABLE_MESSAGE.to_string(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        match err.code {
            ErrorCode::InvalidAddress => Self::invalid_address(),
            ErrorCode::BadRequest => Self::bad_request(err.message.clone()),
            code if code.is_oracle_failure() => Self::verification_unavailable(),
            _ => Self::internal("Server error"),
        }
    }
}

// ============================================
// Verify
// ============================================

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Any JSON type is accepted here so a missing or non-string address
    /// fails validation instead of body parsing
    #[serde(default)]
    pub address: Option<serde_json::Value>,
}

impl VerifyRequest {
    /// Address as submitted, or "" when absent or not a string
    pub fn address(&self) -> &str {
        match &self.address {
            Some(serde_json::Value::String(s)) => s,
            _ => "",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VerifyData {
    pub granted: bool,
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub counters: TelemetryStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
