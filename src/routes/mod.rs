pub mod health;
pub mod profiles;

use axum::{routing::get, routing::put, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Client profiles
        .route(
            "/api/v1/profiles/:email",
            get(profiles::get_client_profile),
        )
        .route(
            "/api/v1/profiles/:email",
            put(profiles::update_client_profile),
        )
}
