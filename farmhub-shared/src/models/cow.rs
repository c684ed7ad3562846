/// Cow model and database operations
///
/// Cows are attached to exactly one farmer and identified by a globally
/// unique tag.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cows (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     tag_id VARCHAR(64) NOT NULL UNIQUE,
///     farmer_id UUID NOT NULL REFERENCES farmers(id) ON DELETE CASCADE,
///     birth_date DATE,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Cow model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cow {
    pub id: Uuid,

    /// Ear-tag identifier, unique across all farms
    pub tag_id: String,

    /// Owning farmer
    pub farmer_id: Uuid,

    pub birth_date: Option<NaiveDate>,

    /// User who created the record
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cow joined with its farmer, farm, and milk-record count for API responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CowDetail {
    pub id: Uuid,
    pub tag_id: String,
    pub birth_date: Option<NaiveDate>,
    pub farmer_id: Uuid,
    pub farmer_user_id: Uuid,
    pub farmer_username: String,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub created_by: Uuid,
    pub milk_records_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query scope for cow listings and lookups
///
/// Farmers only ever see their own herd; admins and agents see everything,
/// optionally narrowed to one farmer by the nested route.
#[derive(Debug, Clone, Copy, Default)]
pub struct CowScope {
    /// Restrict to cows of this farmer profile (nested routes)
    pub farmer_id: Option<Uuid>,

    /// Restrict to cows whose farmer belongs to this user (farmer callers)
    pub owner_user_id: Option<Uuid>,
}

/// Input for creating a cow
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCow {
    pub tag_id: String,
    pub farmer_id: Uuid,
    pub birth_date: Option<NaiveDate>,
    pub created_by: Uuid,
}

/// Input for updating a cow; only non-None fields are written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCow {
    pub tag_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

const COW_DETAIL_COLUMNS: &str = "c.id, c.tag_id, c.birth_date, c.farmer_id, \
     fr.user_id AS farmer_user_id, u.username AS farmer_username, \
     fr.farm_id, f.name AS farm_name, c.created_by, \
     (SELECT COUNT(*) FROM milk_records WHERE cow_id = c.id) AS milk_records_count, \
     c.created_at, c.updated_at";

const COW_DETAIL_FROM: &str = "FROM cows c \
     JOIN farmers fr ON fr.id = c.farmer_id \
     JOIN users u ON u.id = fr.user_id \
     JOIN farms f ON f.id = fr.farm_id";

const COW_SCOPE_WHERE: &str = "($1::uuid IS NULL OR c.farmer_id = $1) \
     AND ($2::uuid IS NULL OR fr.user_id = $2)";

impl Cow {
    /// Creates a new cow
    ///
    /// # Errors
    ///
    /// A duplicate tag surfaces as a unique-constraint violation.
    pub async fn create(pool: &PgPool, data: CreateCow) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Cow>(
            r#"
            INSERT INTO cows (tag_id, farmer_id, birth_date, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tag_id, farmer_id, birth_date, created_by, created_at, updated_at
            "#,
        )
        .bind(data.tag_id)
        .bind(data.farmer_id)
        .bind(data.birth_date)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds a cow by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Cow>(
            "SELECT id, tag_id, farmer_id, birth_date, created_by, created_at, updated_at FROM cows WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a cow detail within a scope
    ///
    /// A farmer looking up a foreign cow falls outside their scope and gets
    /// `None`, which the API surfaces as 404.
    pub async fn find_detail(
        pool: &PgPool,
        id: Uuid,
        scope: CowScope,
    ) -> Result<Option<CowDetail>, sqlx::Error> {
        sqlx::query_as::<_, CowDetail>(&format!(
            "SELECT {COW_DETAIL_COLUMNS} {COW_DETAIL_FROM} WHERE {COW_SCOPE_WHERE} AND c.id = $3"
        ))
        .bind(scope.farmer_id)
        .bind(scope.owner_user_id)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists cow details within a scope, newest first
    pub async fn list_details(
        pool: &PgPool,
        scope: CowScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CowDetail>, sqlx::Error> {
        sqlx::query_as::<_, CowDetail>(&format!(
            r#"
            SELECT {COW_DETAIL_COLUMNS} {COW_DETAIL_FROM}
            WHERE {COW_SCOPE_WHERE}
            ORDER BY c.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(scope.farmer_id)
        .bind(scope.owner_user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts cows within a scope
    pub async fn count(pool: &PgPool, scope: CowScope) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) {COW_DETAIL_FROM} WHERE {COW_SCOPE_WHERE}"
        ))
        .bind(scope.farmer_id)
        .bind(scope.owner_user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Updates a cow; returns None if the cow doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCow,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Cow>(
            r#"
            UPDATE cows
            SET tag_id = COALESCE($2, tag_id),
                birth_date = COALESCE($3, birth_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, tag_id, farmer_id, birth_date, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.tag_id)
        .bind(data.birth_date)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a cow by ID, cascading to its milk records
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cows WHERE id = $1")
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
        let scope = CowScope::default();
        assert!(scope.farmer_id.is_none());
        assert!(scope.owner_user_id.is_none());
    }
}
