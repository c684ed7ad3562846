/// Raw SQL aggregation queries
///
/// The reporting service deliberately bypasses the shared model layer:
/// every endpoint is answered by SQL-side sums, counts, and joins against
/// the schema the API server writes. Missing data is normalized to zero
/// with COALESCE rather than surfacing as null.
///
/// Denormalized names (a farmer's email, a farm's name) come from
/// secondary lookups whose failures are masked with placeholder values;
/// a dashboard row with "Unknown" beats a 500.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Per-farm rollup
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FarmSummary {
    pub id: Uuid,
    pub name: String,
    pub farmers_count: i64,
    pub cows_count: i64,
    pub total_milk: f64,
}

/// Per-farmer rollup with denormalized names
#[derive(Debug, Clone, Serialize)]
pub struct FarmerSummary {
    pub id: Uuid,
    pub user_email: String,
    pub farm_name: String,
    pub cows_count: i64,
    pub total_milk: f64,
}

/// Global production rollup
#[derive(Debug, Clone, Serialize)]
pub struct MilkProductionSummary {
    pub total_farms: i64,
    pub total_farmers: i64,
    pub total_cows: i64,
    pub total_milk: f64,
    pub average_per_cow: f64,
}

/// One day's production within a date range
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MilkByDateRow {
    pub date: NaiveDate,
    pub total_liters: f64,
    pub cow_count: i64,
}

/// Recent activity entry with denormalized farmer name
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub id: Uuid,
    pub farmer_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Internal per-farmer aggregate row before name resolution
#[derive(Debug, sqlx::FromRow)]
struct FarmerAggregateRow {
    id: Uuid,
    user_id: Uuid,
    cows_count: i64,
    total_milk: f64,
}

/// Internal activity row before name resolution
#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    farmer_id: Uuid,
    description: String,
    created_at: DateTime<Utc>,
}

const FARM_SUMMARY_SELECT: &str = r#"
    SELECT f.id, f.name,
           (SELECT COUNT(*) FROM farmers fr WHERE fr.farm_id = f.id) AS farmers_count,
           (SELECT COUNT(*) FROM cows c JOIN farmers fr ON fr.id = c.farmer_id
             WHERE fr.farm_id = f.id) AS cows_count,
           COALESCE((SELECT SUM(m.liters) FROM milk_records m
                      JOIN cows c ON c.id = m.cow_id
                      JOIN farmers fr ON fr.id = c.farmer_id
                     WHERE fr.farm_id = f.id), 0)::float8 AS total_milk
    FROM farms f
"#;

/// Rollups for every farm
pub async fn farms_summary(pool: &PgPool) -> Result<Vec<FarmSummary>, sqlx::Error> {
    sqlx::query_as::<_, FarmSummary>(&format!("{FARM_SUMMARY_SELECT} ORDER BY f.created_at"))
        .fetch_all(pool)
        .await
}

/// Rollup for one farm, None when it doesn't exist
pub async fn farm_summary(pool: &PgPool, farm_id: Uuid) -> Result<Option<FarmSummary>, sqlx::Error> {
    sqlx::query_as::<_, FarmSummary>(&format!("{FARM_SUMMARY_SELECT} WHERE f.id = $1"))
        .bind(farm_id)
        .fetch_optional(pool)
        .await
}

/// Resolves a farmer's user email, masking failures
///
/// A failed or empty lookup yields "User #<id>" / "Unknown" instead of an
/// error.
async fn lookup_user_email(pool: &PgPool, farmer_id: Uuid, user_id: Uuid) -> String {
    let result: Result<Option<(String,)>, sqlx::Error> = sqlx::query_as(
        "SELECT email FROM users WHERE id = (SELECT user_id FROM farmers WHERE id = $1)",
    )
    .bind(farmer_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some((email,))) => email,
        Ok(None) => "Unknown".to_string(),
        Err(_) => format!("User #{user_id}"),
    }
}

/// Resolves a farmer's farm name, masking failures
async fn lookup_farm_name(pool: &PgPool, farmer_id: Uuid) -> String {
    let result: Result<Option<(String,)>, sqlx::Error> = sqlx::query_as(
        "SELECT name FROM farms WHERE id = (SELECT farm_id FROM farmers WHERE id = $1)",
    )
    .bind(farmer_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some((name,))) => name,
        _ => "Unknown".to_string(),
    }
}

/// Resolves a farmer's full name, masking failures
async fn lookup_farmer_name(pool: &PgPool, farmer_id: Uuid) -> String {
    let result: Result<Option<(String,)>, sqlx::Error> = sqlx::query_as(
        r#"
        SELECT u.first_name || ' ' || u.last_name AS full_name
        FROM users u
        JOIN farmers fr ON u.id = fr.user_id
        WHERE fr.id = $1
        "#,
    )
    .bind(farmer_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some((name,))) => name,
        _ => format!("Farmer #{farmer_id}"),
    }
}

async fn resolve_farmer_summary(pool: &PgPool, row: FarmerAggregateRow) -> FarmerSummary {
    let user_email = lookup_user_email(pool, row.id, row.user_id).await;
    let farm_name = lookup_farm_name(pool, row.id).await;

    FarmerSummary {
        id: row.id,
        user_email,
        farm_name,
        cows_count: row.cows_count,
        total_milk: row.total_milk,
    }
}

/// Rollups for every farmer, optionally restricted to one farm
pub async fn farmers_summary(
    pool: &PgPool,
    farm_id: Option<Uuid>,
) -> Result<Vec<FarmerSummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FarmerAggregateRow>(
        r#"
        SELECT fr.id, fr.user_id,
               COUNT(DISTINCT c.id) AS cows_count,
               COALESCE(SUM(m.liters), 0)::float8 AS total_milk
        FROM farmers fr
        LEFT JOIN cows c ON c.farmer_id = fr.id
        LEFT JOIN milk_records m ON m.cow_id = c.id
        WHERE ($1::uuid IS NULL OR fr.farm_id = $1)
        GROUP BY fr.id, fr.user_id
        ORDER BY fr.created_at
        "#,
    )
    .bind(farm_id)
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        summaries.push(resolve_farmer_summary(pool, row).await);
    }

    Ok(summaries)
}

/// Rollup for one farmer, None when the profile doesn't exist
pub async fn farmer_summary(
    pool: &PgPool,
    farmer_id: Uuid,
) -> Result<Option<FarmerSummary>, sqlx::Error> {
    let row = sqlx::query_as::<_, FarmerAggregateRow>(
        r#"
        SELECT fr.id, fr.user_id,
               COUNT(DISTINCT c.id) AS cows_count,
               COALESCE(SUM(m.liters), 0)::float8 AS total_milk
        FROM farmers fr
        LEFT JOIN cows c ON c.farmer_id = fr.id
        LEFT JOIN milk_records m ON m.cow_id = c.id
        WHERE fr.id = $1
        GROUP BY fr.id, fr.user_id
        "#,
    )
    .bind(farmer_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(resolve_farmer_summary(pool, row).await)),
        None => Ok(None),
    }
}

/// Global production rollup, with milk/cow totals honoring the filters
///
/// Farm and farmer counts stay global even when filters are supplied,
/// matching the dashboards built against the original service.
pub async fn milk_summary(
    pool: &PgPool,
    farm_id: Option<Uuid>,
    farmer_id: Option<Uuid>,
) -> Result<MilkProductionSummary, sqlx::Error> {
    let (total_farms,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM farms")
        .fetch_one(pool)
        .await?;
    let (total_farmers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM farmers")
        .fetch_one(pool)
        .await?;

    let (total_cows,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM cows c
        JOIN farmers fr ON fr.id = c.farmer_id
        WHERE ($1::uuid IS NULL OR fr.farm_id = $1)
          AND ($2::uuid IS NULL OR c.farmer_id = $2)
        "#,
    )
    .bind(farm_id)
    .bind(farmer_id)
    .fetch_one(pool)
    .await?;

    let (total_milk,): (f64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(m.liters), 0)::float8 FROM milk_records m
        JOIN cows c ON c.id = m.cow_id
        JOIN farmers fr ON fr.id = c.farmer_id
        WHERE ($1::uuid IS NULL OR fr.farm_id = $1)
          AND ($2::uuid IS NULL OR c.farmer_id = $2)
        "#,
    )
    .bind(farm_id)
    .bind(farmer_id)
    .fetch_one(pool)
    .await?;

    let average_per_cow = if total_cows > 0 {
        total_milk / total_cows as f64
    } else {
        0.0
    };

    Ok(MilkProductionSummary {
        total_farms,
        total_farmers,
        total_cows,
        total_milk,
        average_per_cow,
    })
}

/// Daily production buckets within an inclusive date range
///
/// Returns an empty list, not an error, when nothing matches.
pub async fn milk_by_date(
    pool: &PgPool,
    start_date: NaiveDate,
    end_date: NaiveDate,
    farm_id: Option<Uuid>,
    farmer_id: Option<Uuid>,
) -> Result<Vec<MilkByDateRow>, sqlx::Error> {
    sqlx::query_as::<_, MilkByDateRow>(
        r#"
        SELECT m.date,
               COALESCE(SUM(m.liters), 0)::float8 AS total_liters,
               COUNT(DISTINCT m.cow_id) AS cow_count
        FROM milk_records m
        JOIN cows c ON c.id = m.cow_id
        JOIN farmers fr ON fr.id = c.farmer_id
        WHERE m.date >= $1 AND m.date <= $2
          AND ($3::uuid IS NULL OR fr.farm_id = $3)
          AND ($4::uuid IS NULL OR c.farmer_id = $4)
        GROUP BY m.date
        ORDER BY m.date
        "#,
    )
    .bind(start_date)
    .bind(end_date)
    .bind(farm_id)
    .bind(farmer_id)
    .fetch_all(pool)
    .await
}

/// Recent activities, newest first, with denormalized farmer names
pub async fn recent_activities(
    pool: &PgPool,
    farm_id: Option<Uuid>,
    farmer_id: Option<Uuid>,
) -> Result<Vec<ActivitySummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT a.id, a.farmer_id, a.description, a.created_at
        FROM activities a
        JOIN farmers fr ON fr.id = a.farmer_id
        WHERE ($1::uuid IS NULL OR fr.farm_id = $1)
          AND ($2::uuid IS NULL OR a.farmer_id = $2)
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(farm_id)
    .bind(farmer_id)
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let farmer_name = lookup_farmer_name(pool, row.farmer_id).await;
        summaries.push(ActivitySummary {
            id: row.id,
            farmer_name,
            description: row.description,
            created_at: row.created_at,
        });
    }

    Ok(summaries)
}
