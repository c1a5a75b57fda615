//! BscScan client tests against a local stub explorer
//!
//! Each test binds an axum server on 127.0.0.1:0 that records the query
//! string and answers with a canned status/body.

use alloy_primitives::U256;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use holder_gate::{
    create_router, validate_address, AccessVerifier, AppState, BalanceOracle, BalanceQuery,
    BscScanClient, ErrorCode, OracleConfig, RateLimiter, TelemetryCollector,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

const HOLDER: &str = "0x8894E0a0c962CB723c1976a4421c95949bE2D4E3";
const CONTRACT: &str = "0x55d398326f99059fF775485246999027B3197955";

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    delay: Duration,
    seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn explorer(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    stub.seen.lock().unwrap().push(params);
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (stub.status, stub.body.clone())
}

/// Start a stub explorer; returns its /api URL and the recorded queries
async fn spawn_explorer(
    status: StatusCode,
    body: &str,
    delay: Duration,
) -> (String, Arc<Mutex<Vec<HashMap<String, String>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body: body.to_string(),
        delay,
        seen: seen.clone(),
    };
    let app = Router::new().route("/api", get(explorer)).with_state(stub);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), seen)
}

fn client(base_url: &str, timeout: Duration) -> BscScanClient {
    BscScanClient::new(&OracleConfig {
        base_url: base_url.to_string(),
        api_key: "test-key".to_string(),
        timeout,
    })
    .unwrap()
}

fn query() -> BalanceQuery {
    BalanceQuery {
        token_contract: CONTRACT.to_string(),
        holder: validate_address(HOLDER).unwrap(),
    }
}

#[tokio::test]
async fn test_sends_token_balance_query() {
    let (url, seen) = spawn_explorer(
        StatusCode::OK,
        r#"{"status":"1","message":"OK","result":"5000000000000000000"}"#,
        Duration::ZERO,
    )
    .await;

    let balance = client(&url, Duration::from_secs(5))
        .fetch_balance(&query())
        .await
        .unwrap();
    assert_eq!(balance, U256::from(5_000_000_000_000_000_000u128));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let params = &seen[0];
    assert_eq!(params["module"], "account");
    assert_eq!(params["action"], "tokenbalance");
    assert_eq!(params["contractaddress"], CONTRACT);
    assert_eq!(params["address"], HOLDER);
    assert_eq!(params["tag"], "latest");
    assert_eq!(params["apikey"], "test-key");
}

#[tokio::test]
async fn test_status_flag_failure_is_rejected() {
    let (url, _) = spawn_explorer(
        StatusCode::OK,
        r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#,
        Duration::ZERO,
    )
    .await;

    let err = client(&url, Duration::from_secs(5))
        .fetch_balance(&query())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OracleRejected);
    assert!(err.message.contains("NOTOK"));
}

#[tokio::test]
async fn test_http_error_is_unavailable() {
    let (url, _) = spawn_explorer(StatusCode::SERVICE_UNAVAILABLE, "down", Duration::ZERO).await;

    let err = client(&url, Duration::from_secs(5))
        .fetch_balance(&query())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OracleUnavailable);
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (url, _) = spawn_explorer(StatusCode::OK, "<html>oops</html>", Duration::ZERO).await;

    let err = client(&url, Duration::from_secs(5))
        .fetch_balance(&query())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OracleMalformedResponse);
}

#[tokio::test]
async fn test_non_numeric_result_is_malformed() {
    let (url, _) = spawn_explorer(
        StatusCode::OK,
        r#"{"status":"1","message":"OK","result":"lots"}"#,
        Duration::ZERO,
    )
    .await;

    let err = client(&url, Duration::from_secs(5))
        .fetch_balance(&query())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OracleMalformedResponse);
}

#[tokio::test]
async fn test_timeout_is_unavailable() {
    let (url, _) = spawn_explorer(
        StatusCode::OK,
        r#"{"status":"1","message":"OK","result":"1"}"#,
        Duration::from_secs(3),
    )
    .await;

    let err = client(&url, Duration::from_millis(200))
        .fetch_balance(&query())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OracleUnavailable);
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    // Bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}/api", addr), Duration::from_secs(2))
        .fetch_balance(&query())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OracleUnavailable);
}

#[tokio::test]
async fn test_end_to_end_through_router() {
    let (url, seen) = spawn_explorer(
        StatusCode::OK,
        r#"{"status":"1","message":"OK","result":"1000000000000000000"}"#,
        Duration::ZERO,
    )
    .await;

    let oracle = Arc::new(client(&url, Duration::from_secs(5)));
    let verifier = AccessVerifier::new(oracle, CONTRACT, "4".parse().unwrap());
    let state = Arc::new(AppState::new(
        verifier,
        Arc::new(RateLimiter::default()),
        Arc::new(TelemetryCollector::new()),
        false,
    ));
    let app = create_router(state);

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/verify")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(format!(r#"{{"address":"{}"}}"#, HOLDER)))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["granted"], false);
    assert_eq!(seen.lock().unwrap().len(), 1);
}
