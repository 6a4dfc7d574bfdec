//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the catalog)
//!
//! # Products
//! GET  /products/              - Discover products near a point, by menu category
//! GET  /products/{id}          - Single public product (counts a view)
//!
//! # Reference data
//! GET  /tags                   - All tags
//! GET  /menu-categories        - All menu categories
//! ```

pub mod health;
pub mod products;
pub mod reference;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::filter_products_from_nearby_stores))
        .route("/products/", get(products::filter_products_from_nearby_stores))
        .route("/products/{id}", get(products::get_product_by_id))
        .route("/tags", get(reference::list_tags))
        .route("/menu-categories", get(reference::list_menu_categories))
}

/// Build the full application router with health checks and the HTTP layers.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        #[allow(clippy::cast_possible_truncation)]
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
