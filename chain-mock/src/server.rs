//! Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::ledger::MockLedger;

pub fn create_router(ledger: Arc<MockLedger>) -> Router {
    // Configure CORS to allow requests from the swap server and tests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Sui fullnode JSON-RPC
        .route("/", post(json_rpc))

        // DexScreener token pairs
        .route("/latest/dex/tokens/:token", get(token_pairs))

        // Mock control endpoints
        .route("/mock/balance", post(set_balance))
        .route("/mock/price", post(set_price))

        // Shared state
        .with_state(ledger)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(ledger: Arc<MockLedger>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(ledger);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Chain mock server listening on http://{}", addr);
    log::info!("📡 JSON-RPC: POST /   Prices: GET /latest/dex/tokens/:token");
    log::info!("🔧 Control: POST /mock/balance, POST /mock/price");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the mock on an ephemeral localhost port.
///
/// Returns the bound address and the server task; abort the task to stop.
pub async fn spawn(ledger: Arc<MockLedger>) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(ledger);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Chain mock server stopped: {}", e);
        }
    });

    Ok((addr, handle))
}
