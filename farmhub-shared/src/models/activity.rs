/// Activity model and database operations
///
/// Free-text log entries attributed to a farmer, listed newest first. The
/// acting user is kept separately from the creator so an entry survives the
/// actor's account deletion (`SET NULL`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE activities (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     farmer_id UUID NOT NULL REFERENCES farmers(id) ON DELETE CASCADE,
///     actor_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     description VARCHAR(255) NOT NULL,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Activity model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    pub id: Uuid,

    /// Farmer the entry is about
    pub farmer_id: Uuid,

    /// User who performed the logged action, if still present
    pub actor_id: Option<Uuid>,

    pub description: String,

    /// User who created the entry
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Activity joined with farmer and actor names for API responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityDetail {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub farmer_user_id: Uuid,
    pub farmer_username: String,
    pub actor_id: Option<Uuid>,
    pub actor_username: Option<String>,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for activity listings
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityScope {
    /// Restrict to one farmer (nested routes)
    pub farmer_id: Option<Uuid>,

    /// Restrict to farmers of one farm (nested routes)
    pub farm_id: Option<Uuid>,
}

/// Input for creating an activity
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub farmer_id: Uuid,
    pub actor_id: Uuid,
    pub description: String,
    pub created_by: Uuid,
}

const ACTIVITY_DETAIL_COLUMNS: &str = "a.id, a.farmer_id, fr.user_id AS farmer_user_id, \
     fu.username AS farmer_username, a.actor_id, au.username AS actor_username, \
     a.description, a.created_by, a.created_at, a.updated_at";

const ACTIVITY_DETAIL_FROM: &str = "FROM activities a \
     JOIN farmers fr ON fr.id = a.farmer_id \
     JOIN users fu ON fu.id = fr.user_id \
     LEFT JOIN users au ON au.id = a.actor_id";

impl Activity {
    /// Creates a new activity entry
    pub async fn create(pool: &PgPool, data: CreateActivity) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (farmer_id, actor_id, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, farmer_id, actor_id, description, created_by, created_at, updated_at
            "#,
        )
        .bind(data.farmer_id)
        .bind(data.actor_id)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds an activity by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            "SELECT id, farmer_id, actor_id, description, created_by, created_at, updated_at \
             FROM activities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds an activity with names joined
    pub async fn find_detail(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ActivityDetail>, sqlx::Error> {
        sqlx::query_as::<_, ActivityDetail>(&format!(
            "SELECT {ACTIVITY_DETAIL_COLUMNS} {ACTIVITY_DETAIL_FROM} WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists activities within a scope, newest first
    pub async fn list_details(
        pool: &PgPool,
        scope: ActivityScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityDetail>, sqlx::Error> {
        sqlx::query_as::<_, ActivityDetail>(&format!(
            r#"
            SELECT {ACTIVITY_DETAIL_COLUMNS} {ACTIVITY_DETAIL_FROM}
            WHERE ($1::uuid IS NULL OR a.farmer_id = $1)
              AND ($2::uuid IS NULL OR fr.farm_id = $2)
            ORDER BY a.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(scope.farmer_id)
        .bind(scope.farm_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts activities within a scope
    pub async fn count(pool: &PgPool, scope: ActivityScope) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM activities a JOIN farmers fr ON fr.id = a.farmer_id
            WHERE ($1::uuid IS NULL OR a.farmer_id = $1)
              AND ($2::uuid IS NULL OR fr.farm_id = $2)
            "#,
        )
        .bind(scope.farmer_id)
        .bind(scope.farm_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Updates an activity's description
    pub async fn update_description(
        pool: &PgPool,
        id: Uuid,
        description: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities SET description = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, farmer_id, actor_id, description, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(description)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an activity by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
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
    fn test_default_scope_is_unrestricted() {
        let scope = ActivityScope::default();
        assert!(scope.farmer_id.is_none());
        assert!(scope.farm_id.is_none());
    }
}
