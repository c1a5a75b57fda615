//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

use super::types::*;
use crate::core::throttle::RequestThrottle;
use crate::core::verifier::AccessVerifier;
use crate::models::errors::AppError;
use crate::utils::telemetry::{RequestOutcome, TelemetryCollector};

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub verifier: AccessVerifier,
    pub throttle: Arc<dyn RequestThrottle>,
    pub telemetry: Arc<TelemetryCollector>,
    /// Key throttling on X-Forwarded-For
    pub trust_proxy: bool,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        verifier: AccessVerifier,
        throttle: Arc<dyn RequestThrottle>,
        telemetry: Arc<TelemetryCollector>,
        trust_proxy: bool,
    ) -> Self {
        Self {
            verifier,
            throttle,
            telemetry,
            trust_proxy,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Map an [`AppError`] to its HTTP status and envelope
pub fn reject(err: &AppError, start: Instant) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(err.into(), elapsed_ms(start))))
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Access Verification
// ============================================

pub async fn verify_access(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<VerifyData>>, ApiFailure> {
    let start = Instant::now();

    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let err = AppError::bad_request(rejection.body_text());
            warn!(code = err.code_str(), error = %err.message, "Rejected request body");
            state
                .telemetry
                .record(RequestOutcome::Failed(err.code), start.elapsed().as_millis() as u64);
            return Err(reject(&err, start));
        }
    };

    match state.verifier.verify(req.address()).await {
        Ok(verdict) => {
            let outcome = if verdict.granted {
                RequestOutcome::Granted
            } else {
                RequestOutcome::Denied
            };
            state
                .telemetry
                .record(outcome, start.elapsed().as_millis() as u64);

            Ok(Json(ApiResponse::success(
                VerifyData {
                    granted: verdict.granted,
                },
                elapsed_ms(start),
            )))
        }
        Err(err) => {
            if err.code.is_oracle_failure() {
                error!(
                    code = err.code_str(),
                    address = %req.address(),
                    error = %err.message,
                    "Balance verification failed"
                );
            } else {
                warn!(code = err.code_str(), address = ?req.address(), "Rejected verification request");
            }
            state
                .telemetry
                .record(RequestOutcome::Failed(err.code), start.elapsed().as_millis() as u64);
            Err(reject(&err, start))
        }
    }
}

// ============================================
// Stats / Telemetry
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        counters: state.telemetry.get_stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: "v1".to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
