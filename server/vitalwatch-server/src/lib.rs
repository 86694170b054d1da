//! VitalWatch Server - patient vital-sign monitoring API
//!
//! This library provides the HTTP layer of VitalWatch: configuration,
//! authentication extractors, handlers, routing and the middleware stack.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod validation;

// Re-export commonly used types
pub use config::{Environment, ServerConfig};
pub use error::*;
pub use server::AppState;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Create the main application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(middleware::handle_panic))
                .layer(TimeoutLayer::new(config.request_timeout()))
                .layer(middleware::create_cors_layer(&config.cors_origins))
                .layer(from_fn(middleware::request_timing_middleware))
                .layer(from_fn_with_state(state.clone(), middleware::audit_logging_middleware)),
        )
        .with_state(state)
}
