//! HolderGate API Server
//!
//! Token-holder access verification over HTTP
//!
//! Usage:
//!   cargo run --bin holder_gate_api
//!
//! Environment (a `.env` file is loaded when present):
//!   BSCSCAN_API_KEY  - Oracle API key (required)
//!   CONTRACT_ADDRESS - Token contract (required)
//!   MIN_BALANCE      - Minimum whole-token balance (required)
//!   PORT / HOST      - Bind address (default: 0.0.0.0:3000)
//!   RUST_LOG         - Log level (default: info)

use holder_gate::utils::constants::{APP_NAME, APP_VERSION};
use holder_gate::{
    create_router, start_cleanup_task, AccessVerifier, AppState, BscScanClient, GateConfig,
    RateLimiter, TelemetryCollector,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // .env is optional
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();
    if dotenv_loaded {
        info!("Loaded environment from .env");
    }

    // Configuration is read once; missing oracle settings abort startup
    let config = match GateConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.code_str(), "❌ {}", e.message);
            return Err(eyre::eyre!(e));
        }
    };
    info!(
        contract = %config.contract_address,
        min_balance = %config.min_balance,
        oracle = %config.oracle.base_url,
        "Access policy loaded"
    );

    // Oracle + pipeline
    let oracle = Arc::new(BscScanClient::new(&config.oracle)?);
    let verifier = AccessVerifier::new(
        oracle,
        config.contract_address.clone(),
        config.min_balance.clone(),
    );

    // Throttle state, with background eviction
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    start_cleanup_task(limiter.clone());
    info!(
        window_secs = config.rate_limit.window_duration.as_secs(),
        max_requests = config.rate_limit.requests_per_window,
        trust_proxy = config.trust_proxy,
        "🧹 Throttle enabled"
    );

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    // Create app state
    let state = Arc::new(AppState::new(verifier, limiter, telemetry, config.trust_proxy));

    // Create router
    let app = create_router(state);

    let addr: SocketAddr = config.bind_addr()?;

    info!("🚀 {} v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  POST /verify        - Verify token-holder access");
    info!("  GET  /v1/stats      - Request statistics");
    info!("  GET  /health        - Health check");
    info!("Press Ctrl+C for graceful shutdown");

    // Start server with graceful shutdown
    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    // Peer address feeds the throttle key
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("🛑 Shutdown signal received");
    let stats = telemetry_for_shutdown.get_stats();
    info!(
        total = stats.total_requests,
        granted = stats.granted,
        denied = stats.denied,
        throttled = stats.throttled,
        oracle_failures = stats.oracle_failures,
        "Final request statistics"
    );
    info!("👋 {} shutdown complete", APP_NAME);

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════╗
    ║                                          ║
    ║        H O L D E R   G A T E             ║
    ║   token-holder access verification       ║
    ║                                          ║
    ╚══════════════════════════════════════════╝
    "#
    );
}
