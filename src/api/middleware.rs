//! API Middleware (Rate Limiting, Logging)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use super::handlers::AppState;
use super::types::{ApiError, ApiResponse};
use crate::core::throttle::{RateLimiter, ThrottleDecision};
use crate::utils::constants::THROTTLE_CLEANUP_INTERVAL_SECS;

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn is_health_path(path: &str) -> bool {
    path == "/health" || path == "/v1/health"
}

/// Caller identity used as throttle key.
///
/// Peer IP by default; first `X-Forwarded-For` hop (then `X-Real-IP`) when
/// running behind a trusted proxy.
pub fn caller_identity(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let headers = request.headers();
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware. Runs before body parsing and validation.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    // Skip rate limiting for health check
    if is_health_path(request.uri().path()) {
        return next.run(request).await;
    }

    let caller = caller_identity(&request, state.trust_proxy);

    match state.throttle.try_consume(&caller) {
        ThrottleDecision::Denied { retry_after_secs } => {
            warn!(caller = %caller, retry_after_secs, "Rate limit exceeded");
            state.telemetry.record_throttled();

            let body = ApiResponse::error(ApiError::rate_limited(retry_after_secs), 0.0);
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
            response
        }
        ThrottleDecision::Allowed {
            remaining,
            reset_secs,
        } => {
            let mut response = next.run(request).await;

            // Add rate limit headers
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-remaining", remaining.into());
            headers.insert("x-ratelimit-reset", reset_secs.into());

            response
        }
    }
}

/// Request logging middleware; tags every response with a request id
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4().to_string();

    let mut response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}

/// Periodically evict throttle entries whose window has elapsed
pub fn start_cleanup_task(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(THROTTLE_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let removed = limiter.cleanup();
            if removed > 0 {
                info!("🧹 Throttle cleanup: {} expired callers removed", removed);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = axum::http::Request::builder().uri("/verify");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_identity_from_peer() {
        let mut req = request(&[("x-forwarded-for", "9.9.9.9")]);
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.7:5555".parse::<SocketAddr>().unwrap()));
        assert_eq!(caller_identity(&req, false), "10.0.0.7");
    }

    #[test]
    fn test_identity_from_proxy_headers() {
        let req = request(&[("x-forwarded-for", " 1.2.3.4 , 10.0.0.1")]);
        assert_eq!(caller_identity(&req, true), "1.2.3.4");

        let req = request(&[("x-real-ip", "5.6.7.8")]);
        assert_eq!(caller_identity(&req, true), "5.6.7.8");
    }

    #[test]
    fn test_identity_unknown() {
        assert_eq!(caller_identity(&request(&[]), true), "unknown");
        assert_eq!(caller_identity(&request(&[]), false), "unknown");
    }
}
