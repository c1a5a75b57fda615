//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so logs can be grepped and
//! monitored per failure class.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - REQ_xxx: request validation / throttling
//! - ORACLE_xxx: balance oracle failures
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message (diagnostics only for oracle errors)
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Request Errors
    // ============================================
    /// Address fails the `0x` + 40 hex syntax check
    InvalidAddress,
    /// Per-caller rate limit hit
    ThrottleExceeded,
    /// Request body could not be parsed
    BadRequest,

    // ============================================
    // Oracle Errors
    // ============================================
    /// Transport failure, timeout or non-success HTTP status
    OracleUnavailable,
    /// Oracle reachable but its status flag reports failure
    OracleRejected,
    /// Oracle payload does not parse as expected
    OracleMalformedResponse,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic
    // ============================================
    /// Internal server error
    Internal,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddress => "REQ_INVALID_ADDRESS",
            Self::ThrottleExceeded => "REQ_THROTTLE_EXCEEDED",
            Self::BadRequest => "REQ_BAD_REQUEST",

            Self::OracleUnavailable => "ORACLE_UNAVAILABLE",
            Self::OracleRejected => "ORACLE_REJECTED",
            Self::OracleMalformedResponse => "ORACLE_MALFORMED_RESPONSE",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidAddress | Self::BadRequest => 400,
            Self::ThrottleExceeded => 429,
            Self::OracleUnavailable | Self::OracleRejected | Self::OracleMalformedResponse => 502,
            _ => 500,
        }
    }

    /// Oracle-side failure: collapsed into one caller-facing outcome
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            Self::OracleUnavailable | Self::OracleRejected | Self::OracleMalformedResponse
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Invalid holder address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    /// Unparsable request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, msg)
    }

    /// Oracle unreachable / non-2xx / timed out
    pub fn oracle_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::OracleUnavailable, msg)
    }

    /// Oracle answered with status != "1"
    pub fn oracle_rejected(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::OracleRejected, msg)
    }

    /// Oracle answered with something we cannot read
    pub fn oracle_malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::OracleMalformedResponse, msg)
    }

    /// Missing environment variable
    pub fn missing_env(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Missing required environment variable: {}", key_name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(key_name: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {}", key_name, reason),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Oracle request timeout"
        } else if err.is_connect() {
            "Oracle connection failed"
        } else {
            "Oracle request failed"
        };
        Self::with_source(ErrorCode::OracleUnavailable, message, err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::OracleMalformedResponse, "JSON parse error", err)
    }
}
