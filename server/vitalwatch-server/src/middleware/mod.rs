pub mod auth_context;

pub use auth_context::{AdminContext, AuthContext};

use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::time::{Duration, Instant};
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

/// Request timing middleware
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    tracing::debug!(
        method = %method,
        path = %logger_redacted::redact(&path),
        duration_ms = start.elapsed().as_millis(),
        status = response.status().as_u16(),
        "Request processed"
    );

    response
}

/// Audit log of who called what and how it ended
///
/// The caller is taken from a valid bearer token when present; the request
/// itself is not rejected here, extractors do that.
pub async fn audit_logging_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = logger_redacted::redact(request.uri().path());
    let user_id = auth_context::authenticate(request.headers(), &state.tokens)
        .map(|ctx| ctx.user_id().to_string())
        .unwrap_or_else(|_| "anonymous".to_string());

    let response = next.run(request).await;

    tracing::info!(
        target: "audit",
        method = %method,
        path = %path,
        user_id = %user_id,
        status = response.status().as_u16(),
        "Request audited"
    );

    response
}

/// Create CORS layer for the application. No origins means any origin.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(AnyOrigin)
    } else {
        layer.allow_origin(allowed)
    }
}

/// Render a caught handler panic as a generic 500
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %logger_redacted::redact(detail), "Handler panicked");

    ApiError::internal(format!("Handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn panic_renders_as_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_origins_are_skipped() {
        // Must not panic on garbage
        let _ = create_cors_layer(&["http://localhost:3000".to_string(), "\n".to_string()]);
    }
}
