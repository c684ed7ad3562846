/// Configuration management for the reporting service
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `REPORTING_HOST`: Host to bind to (default: 0.0.0.0)
/// - `REPORTING_PORT`: Port to bind to (default: 8001)
/// - `RUST_LOG`: Log level (default: info)

use serde::{Deserialize, Serialize};
use std::env;

/// Reporting service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in pool
    ///
    /// The service is read-only; a small pool is plenty.
    pub max_connections: u32,
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("REPORTING_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("REPORTING_PORT")
            .unwrap_or_else(|_| "8001".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8001,
            database_url: "postgresql://localhost/farmhub".to_string(),
            max_connections: 5,
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8001");
    }
}
