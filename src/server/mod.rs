//! HTTP server for the Diliguard API
//!
//! Serves the submission and status endpoints over axum, with Bearer-token
//! auth on API paths and permissive-or-restricted CORS for the dashboard
//! frontend.

mod auth;
mod error;
pub mod routes;
pub mod state;

pub use auth::{generate_auth_token, AuthLayer};
pub use error::ApiError;
pub use state::DiliguardState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

/// Build the application router with auth and CORS applied.
/// Layer order: cors (outer) -> auth -> handler, so preflight requests are
/// handled before the auth check.
pub fn build_app(state: DiliguardState, cors_origins: Option<Vec<String>>) -> Router {
    let cors = match &cors_origins {
        Some(origins) if !origins.is_empty() => {
            // Restricted CORS: only the configured dashboard origins
            let allowed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        }
        _ => {
            // Permissive CORS (default for development)
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        }
    };

    routes::api_router()
        .route("/health", get(health_handler))
        .route("/api/version", get(version_handler))
        .layer(AuthLayer::new(state.auth_token.clone()))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until shutdown is requested
pub async fn run_server(
    port: u16,
    bind: &str,
    state: DiliguardState,
    cors_origins: Option<Vec<String>>,
) -> Result<(), String> {
    let shutdown_state = state.shutdown_state.clone();
    let app = build_app(state, cors_origins);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Diliguard server listening on http://{}", addr);
    log::info!("  POST /api/research          - Submit entity for research");
    log::info!("  GET  /api/research/:id      - Research record & status");
    log::info!("  GET  /api/account/:id/usage - Monthly usage");
    log::info!("  GET  /health                - Health check");

    // Shutdown future resolves when the shared flag flips
    let shutdown_signal = async move {
        loop {
            if shutdown_state.is_shutdown_requested() {
                log::info!("Shutdown signal received, stopping server...");
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Version endpoint
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
