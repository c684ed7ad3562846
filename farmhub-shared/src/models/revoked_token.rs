/// Refresh-token blacklist
///
/// Logout stores the refresh token's `jti` here; the refresh endpoint
/// rejects any token whose `jti` is present. Rows past their expiry carry
/// no information and can be purged at any time.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE revoked_tokens (
///     jti UUID PRIMARY KEY,
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// A blacklisted refresh token
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RevokedToken {
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
}

impl RevokedToken {
    /// Blacklists a refresh token by its `jti`
    ///
    /// Revoking an already-revoked token is a no-op.
    pub async fn revoke(
        pool: &PgPool,
        jti: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Checks whether a `jti` has been blacklisted
    pub async fn is_revoked(pool: &PgPool, jti: Uuid) -> Result<bool, sqlx::Error> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = $1")
                .bind(jti)
                .fetch_optional(pool)
                .await?;

        Ok(row.is_some())
    }

    /// Removes blacklist entries whose tokens have expired anyway
    ///
    /// # Returns
    ///
    /// Number of rows removed
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
