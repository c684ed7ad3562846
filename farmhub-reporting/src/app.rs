/// Application state and router builder for the reporting service
///
/// The service is read-only and unauthenticated, with permissive CORS so
/// dashboards can call it directly from the browser.

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only usage)
    pub db: PgPool,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Builds the reporting router
///
/// ```text
/// /
/// ├── GET /health
/// ├── GET /farms/summary
/// ├── GET /farms/:farm_id/summary
/// ├── GET /farmers/summary
/// ├── GET /farmers/:farmer_id/summary
/// ├── GET /milk/summary
/// ├── GET /milk/by-date
/// └── GET /activities/recent
/// ```
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/farms/summary", get(routes::farms_summary))
        .route("/farms/:farm_id/summary", get(routes::farm_summary))
        .route("/farmers/summary", get(routes::farmers_summary))
        .route("/farmers/:farmer_id/summary", get(routes::farmer_summary))
        .route("/milk/summary", get(routes::milk_summary))
        .route("/milk/by-date", get(routes::milk_by_date))
        .route("/activities/recent", get(routes::recent_activities))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
