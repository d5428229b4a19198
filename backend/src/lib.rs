//! Bakery Admin backend
//!
//! Administrative API for a bakery storefront: catalog, stock ledger,
//! orders and payment verification, scheduled content, staff accounts and
//! the dashboard.

use std::sync::Arc;

use axum::{extract::Request, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod repositories;
pub mod routes;
pub mod services;

pub use config::Config;

use external::ImageStore;
use repositories::Stores;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stores: Stores,
    pub images: Arc<dyn ImageStore>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Request span carrying the path only. The query string can hold an
/// access token for the order stream.
fn request_span(request: &Request) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}

/// Root endpoint
async fn root() -> &'static str {
    "Bakery Admin API v1"
}
