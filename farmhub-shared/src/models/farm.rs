/// Farm model and database operations
///
/// A farm is the top-level organizational unit. Deleting a farm cascades to
/// its farmers, their cows, those cows' milk records, and farmer activities
/// via foreign-key cascade.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE farms (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     location VARCHAR(255) NOT NULL DEFAULT '',
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Farm model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Farm {
    pub id: Uuid,
    pub name: String,
    pub location: String,

    /// User who created the farm
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Farm row joined with its farmer count, the shape list/detail responses use
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FarmWithStats {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub created_by: Uuid,
    pub farmers_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a farm
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFarm {
    pub name: String,
    pub location: String,
    pub created_by: Uuid,
}

/// Input for updating a farm; only non-None fields are written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFarm {
    pub name: Option<String>,
    pub location: Option<String>,
}

const FARM_STATS_COLUMNS: &str = "f.id, f.name, f.location, f.created_by, \
     (SELECT COUNT(*) FROM farmers WHERE farm_id = f.id) AS farmers_count, \
     f.created_at, f.updated_at";

impl Farm {
    /// Creates a new farm
    pub async fn create(pool: &PgPool, data: CreateFarm) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Farm>(
            r#"
            INSERT INTO farms (name, location, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, location, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.location)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds a farm by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farm>(
            "SELECT id, name, location, created_by, created_at, updated_at FROM farms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a farm with its farmer count
    pub async fn find_with_stats(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<FarmWithStats>, sqlx::Error> {
        sqlx::query_as::<_, FarmWithStats>(&format!(
            "SELECT {FARM_STATS_COLUMNS} FROM farms f WHERE f.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists farms with farmer counts, newest first
    pub async fn list_with_stats(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FarmWithStats>, sqlx::Error> {
        sqlx::query_as::<_, FarmWithStats>(&format!(
            "SELECT {FARM_STATS_COLUMNS} FROM farms f ORDER BY f.created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts total number of farms
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM farms")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates a farm; returns None if the farm doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateFarm,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farm>(
            r#"
            UPDATE farms
            SET name = COALESCE($2, name),
                location = COALESCE($3, location),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, location, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.location)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a farm by ID, cascading to farmers, cows, milk records, and
    /// activities
    ///
    /// # Returns
    ///
    /// True if the farm was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_farm_default() {
        let update = UpdateFarm::default();
        assert!(update.name.is_none());
        assert!(update.location.is_none());
    }
}
