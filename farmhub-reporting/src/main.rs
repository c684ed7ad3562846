//! # FarmHub Reporting Service
//!
//! Stateless read-only service answering summary and aggregation queries
//! over the FarmHub schema for dashboards. It shares the database with the
//! API server but none of its write path.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p farmhub-reporting
//! ```

use farmhub_reporting::{
    app::{build_router, AppState},
    config::Config,
};
use farmhub_shared::db::pool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farmhub_reporting=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "FarmHub Reporting Service v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database_url.clone(),
        max_connections: config.max_connections,
        ..Default::default()
    })
    .await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Reporting service listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
