/// Milk record model and database operations
///
/// One row per cow per day. The `(cow_id, date)` unique constraint is the
/// only guard against duplicate entries; a second insert for the same day
/// surfaces as a conflict rather than an overwrite.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE milk_records (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     cow_id UUID NOT NULL REFERENCES cows(id) ON DELETE CASCADE,
///     date DATE NOT NULL,
///     liters NUMERIC(8, 2) NOT NULL,
///     recorded_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (cow_id, date)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Milk record model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MilkRecord {
    pub id: Uuid,

    pub cow_id: Uuid,

    /// Day the yield was measured
    pub date: NaiveDate,

    /// Yield in liters, two decimal places
    pub liters: Decimal,

    /// User who measured the yield
    pub recorded_by: Uuid,

    /// User who created the record
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Milk record joined with its cow for API responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MilkRecordDetail {
    pub id: Uuid,
    pub cow_id: Uuid,
    pub cow_tag_id: String,
    pub date: NaiveDate,
    pub liters: Decimal,
    pub recorded_by: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate totals over a set of milk records
///
/// Sums and averages are normalized to zero when no records match.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct MilkTotals {
    pub total_liters: f64,
    pub total_average: f64,
}

/// Filters for the record-level summary
#[derive(Debug, Clone, Copy, Default)]
pub struct MilkFilter {
    pub cow_id: Option<Uuid>,
    pub farmer_id: Option<Uuid>,

    /// Restrict to records of cows whose farmer belongs to this user
    pub owner_user_id: Option<Uuid>,
}

/// Input for creating a milk record
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMilkRecord {
    pub cow_id: Uuid,
    pub date: NaiveDate,
    pub liters: Decimal,
    pub recorded_by: Uuid,
    pub created_by: Uuid,
}

/// Input for updating a milk record; only non-None fields are written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMilkRecord {
    pub date: Option<NaiveDate>,
    pub liters: Option<Decimal>,
}

const MILK_COLUMNS: &str =
    "id, cow_id, date, liters, recorded_by, created_by, created_at, updated_at";

impl MilkRecord {
    /// Creates a new milk record
    ///
    /// # Errors
    ///
    /// A second record for the same `(cow, date)` violates the unique
    /// constraint and must be surfaced to the client as a conflict.
    pub async fn create(pool: &PgPool, data: CreateMilkRecord) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, MilkRecord>(&format!(
            r#"
            INSERT INTO milk_records (cow_id, date, liters, recorded_by, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MILK_COLUMNS}
            "#
        ))
        .bind(data.cow_id)
        .bind(data.date)
        .bind(data.liters)
        .bind(data.recorded_by)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds a milk record by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MilkRecord>(&format!(
            "SELECT {MILK_COLUMNS} FROM milk_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists one cow's records with the cow tag joined, newest date first
    pub async fn list_for_cow(
        pool: &PgPool,
        cow_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MilkRecordDetail>, sqlx::Error> {
        sqlx::query_as::<_, MilkRecordDetail>(
            r#"
            SELECT m.id, m.cow_id, c.tag_id AS cow_tag_id, m.date, m.liters,
                   m.recorded_by, m.created_by, m.created_at, m.updated_at
            FROM milk_records m JOIN cows c ON c.id = m.cow_id
            WHERE m.cow_id = $1
            ORDER BY m.date DESC, m.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(cow_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts one cow's records
    pub async fn count_for_cow(pool: &PgPool, cow_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM milk_records WHERE cow_id = $1")
                .bind(cow_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Sum and average liters over the filtered record set
    ///
    /// Missing data normalizes to zero rather than null.
    pub async fn totals(pool: &PgPool, filter: MilkFilter) -> Result<MilkTotals, sqlx::Error> {
        sqlx::query_as::<_, MilkTotals>(
            r#"
            SELECT COALESCE(SUM(m.liters), 0)::float8 AS total_liters,
                   COALESCE(AVG(m.liters), 0)::float8 AS total_average
            FROM milk_records m
            JOIN cows c ON c.id = m.cow_id
            JOIN farmers fr ON fr.id = c.farmer_id
            WHERE ($1::uuid IS NULL OR m.cow_id = $1)
              AND ($2::uuid IS NULL OR c.farmer_id = $2)
              AND ($3::uuid IS NULL OR fr.user_id = $3)
            "#,
        )
        .bind(filter.cow_id)
        .bind(filter.farmer_id)
        .bind(filter.owner_user_id)
        .fetch_one(pool)
        .await
    }

    /// Updates a milk record; returns None if it doesn't exist
    ///
    /// Moving a record onto an already-recorded date trips the same unique
    /// constraint as a duplicate insert.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateMilkRecord,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MilkRecord>(&format!(
            r#"
            UPDATE milk_records
            SET date = COALESCE($2, date),
                liters = COALESCE($3, liters),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MILK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.date)
        .bind(data.liters)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a milk record by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM milk_records WHERE id = $1")
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
    fn test_default_filter_is_unrestricted() {
        let filter = MilkFilter::default();
        assert!(filter.cow_id.is_none());
        assert!(filter.farmer_id.is_none());
        assert!(filter.owner_user_id.is_none());
    }

    #[test]
    fn test_liters_round_trips_through_json() {
        let liters: Decimal = "12.50".parse().unwrap();
        let json = serde_json::to_string(&liters).unwrap();
        assert_eq!(json, "\"12.50\"");
        let back: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, liters);
    }
}
