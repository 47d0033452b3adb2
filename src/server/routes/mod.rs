//! API route modules, split by domain:
//! - research_routes: submission and status reads
//! - account_routes: usage reads for the billing dashboard

pub mod account_routes;
pub mod research_routes;

use axum::routing::{get, post};
use axum::Router;

use super::state::DiliguardState;

/// Assemble the `/api` routes
pub fn api_router() -> Router<DiliguardState> {
    Router::new()
        .route("/api/research", post(research_routes::submit_research_handler))
        .route("/api/research/:id", get(research_routes::get_research_handler))
        .route(
            "/api/account/:id/usage",
            get(account_routes::get_account_usage_handler),
        )
}
