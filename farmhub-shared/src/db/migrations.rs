/// Database migration runner
///
/// Migrations live in this crate's `migrations/` directory and are embedded
/// at compile time with `sqlx::migrate!`. Each migration is a pair of
/// `{timestamp}_{name}.up.sql` / `{timestamp}_{name}.down.sql` files.
///
/// # Example
///
/// ```no_run
/// use farmhub_shared::db::pool::{create_pool, DatabaseConfig};
/// use farmhub_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// };
///
/// let pool = create_pool(config).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Both services call this at startup; applying an already-applied
/// migration set is a no-op.
///
/// # Errors
///
/// Returns an error if a migration file is malformed, a migration fails to
/// execute, or the database connection is lost mid-run.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
