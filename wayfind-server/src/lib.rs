//! HTTP surface of the indoor wayfinding engine

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::{sync::Arc, time::Duration};

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{Cli, ServerConfig};
pub use state::AppState;

/// Builds the application router with its middleware stack
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .concurrency_limit(config.concurrency_limit);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/maps/{map_id}/routes", post(handlers::compute_route))
        .route(
            "/maps/{map_id}/routes/from-position",
            post(handlers::compute_route_from_position),
        )
        .route("/maps/{map_id}/evacuation", post(handlers::compute_evacuation))
        .route("/maps/{map_id}/nearest-node", get(handlers::nearest_node))
        .route("/routes/{route_id}", get(handlers::get_route))
        .route("/positions", post(handlers::record_position))
        .with_state(state)
        .layer(middleware)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::GATEWAY_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled internal error: {err}"),
        )
    }
}
