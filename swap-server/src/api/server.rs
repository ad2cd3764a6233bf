use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use suiwal_swap::SwapConfig;
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use crate::state::AppState;

/// Configure CORS based on environment
/// Set ALLOWED_ORIGINS="https://swap.example.com,https://preview.example.com" for production
/// If not set, allows any origin (development mode)
fn cors_layer() -> CorsLayer {
    match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins);
            let origin_list: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| match s.trim().parse() {
                    Ok(origin) => Some(origin),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin: {}", s);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        // Preferences
        .route(
            "/api/settings",
            get(handlers::get_settings_handler).put(handlers::update_settings_handler),
        )
        // Market data
        .route("/api/rate", get(handlers::get_rate_handler))
        .route("/api/prices", get(handlers::get_prices_handler))
        .route("/api/balance/:address", get(handlers::get_balance_handler))
        // Swap
        .route("/api/quote", post(handlers::quote_handler))
        .route("/api/swap/prepare", post(handlers::prepare_swap_handler))
        .layer(cors_layer())
        .with_state(state)
}

pub async fn start_server(config: SwapConfig, addr: &str) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    state.start_price_polling();

    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.stop_price_polling();
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
