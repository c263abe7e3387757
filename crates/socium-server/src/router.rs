//! Axum router construction for the simulation boundary.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers;

/// Build the complete router.
///
/// CORS allows any origin so local visualization clients (including ones
/// opened from `file://`) can poll the server without a proxy.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/state", get(handlers::state))
        .route("/step", post(handlers::step))
        .route("/glitch", post(handlers::glitch))
        .route("/observer", post(handlers::observer))
        .route("/reset", post(handlers::reset))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
