//! API route definitions.

use axum::http::{HeaderValue, Method, header};
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::proxy;
use super::state::AppState;

/// Path prefix the browser-facing proxy is mounted under.
pub const PROXY_PREFIX: &str = "/api/proxy";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            &format!("{PROXY_PREFIX}/{{*path}}"),
            get(proxy::proxy_backend)
                .post(proxy::proxy_backend)
                .put(proxy::proxy_backend)
                .delete(proxy::proxy_backend),
        )
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}

/// Build the CORS layer from the configured origins.
///
/// No configured origins allows any origin.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    if state.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = state
        .cors_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    tracing::info!("CORS: Allowing {} origin(s)", origins.len());
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}
