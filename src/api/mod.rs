//! API module for delivery price analytics
//!
//! Provides the REST interface to the analytics views.

pub mod handlers;
pub mod service;

pub use service::AnalyticsService;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_rest_router(service: Arc<AnalyticsService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/v1/health", get(handlers::health))
        // Dataset
        .route("/api/v1/stats", get(handlers::get_stats))
        .route("/api/v1/options", get(handlers::get_options))
        // Selection views
        .route("/api/v1/comparison", get(handlers::get_comparison))
        .route("/api/v1/breakdown", get(handlers::get_breakdown))
        .route("/api/v1/records", get(handlers::get_records))
        .route("/api/v1/export", get(handlers::export_csv))
        // Aggregates
        .route("/api/v1/averages", get(handlers::get_averages))
        .route("/api/v1/cheapest/cities", get(handlers::get_cheapest_per_city))
        .route("/api/v1/cheapest/overall", get(handlers::get_overall_cheapest))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
