/// HTTP handlers for the reporting service
///
/// # Endpoints
///
/// - `GET /health`
/// - `GET /farms/summary`, `GET /farms/:farm_id/summary`
/// - `GET /farmers/summary[?farm_id]`, `GET /farmers/:farmer_id/summary`
/// - `GET /milk/summary[?farm_id&farmer_id]`
/// - `GET /milk/by-date?start_date&end_date[&farm_id&farmer_id]`
/// - `GET /activities/recent[?farm_id&farmer_id]`

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app::AppState,
    dates::parse_date,
    error::{ReportError, ReportResult},
    queries,
};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// Shared farm/farmer filter pair
#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    pub farm_id: Option<Uuid>,
    pub farmer_id: Option<Uuid>,
}

/// Farm-only filter
#[derive(Debug, Deserialize)]
pub struct FarmQuery {
    pub farm_id: Option<Uuid>,
}

/// Date-range query for `/milk/by-date`
///
/// Dates arrive as raw strings so both accepted formats can be tried.
#[derive(Debug, Deserialize)]
pub struct ByDateQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub farm_id: Option<Uuid>,
    pub farmer_id: Option<Uuid>,
}

/// Health check probing database connectivity
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(HealthResponse {
        status: if database == "connected" {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        database: database.to_string(),
    })
}

/// Per-farm rollups
pub async fn farms_summary(
    State(state): State<AppState>,
) -> ReportResult<Json<Vec<queries::FarmSummary>>> {
    Ok(Json(queries::farms_summary(&state.db).await?))
}

/// One farm's rollup
pub async fn farm_summary(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> ReportResult<Json<queries::FarmSummary>> {
    let summary = queries::farm_summary(&state.db, farm_id)
        .await?
        .ok_or_else(|| ReportError::NotFound("Farm not found".to_string()))?;

    Ok(Json(summary))
}

/// Per-farmer rollups, optionally for one farm
pub async fn farmers_summary(
    State(state): State<AppState>,
    Query(query): Query<FarmQuery>,
) -> ReportResult<Json<Vec<queries::FarmerSummary>>> {
    Ok(Json(queries::farmers_summary(&state.db, query.farm_id).await?))
}

/// One farmer's rollup
pub async fn farmer_summary(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> ReportResult<Json<queries::FarmerSummary>> {
    let summary = queries::farmer_summary(&state.db, farmer_id)
        .await?
        .ok_or_else(|| ReportError::NotFound("Farmer not found".to_string()))?;

    Ok(Json(summary))
}

/// Global production rollup with optional filters
pub async fn milk_summary(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> ReportResult<Json<queries::MilkProductionSummary>> {
    Ok(Json(
        queries::milk_summary(&state.db, query.farm_id, query.farmer_id).await?,
    ))
}

/// Daily production over a required date range
///
/// Both bounds are required; each accepts `YYYY-MM-DD` or `MM/DD/YYYY`.
/// An empty range answers `[]`.
pub async fn milk_by_date(
    State(state): State<AppState>,
    Query(query): Query<ByDateQuery>,
) -> ReportResult<Json<Vec<queries::MilkByDateRow>>> {
    let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref())
    else {
        return Err(ReportError::BadRequest(
            "Both start_date and end_date are required".to_string(),
        ));
    };

    let start_date = parse_date(start)?;
    let end_date = parse_date(end)?;

    Ok(Json(
        queries::milk_by_date(&state.db, start_date, end_date, query.farm_id, query.farmer_id)
            .await?,
    ))
}

/// Recent activities, newest first
pub async fn recent_activities(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> ReportResult<Json<Vec<queries::ActivitySummary>>> {
    Ok(Json(
        queries::recent_activities(&state.db, query.farm_id, query.farmer_id).await?,
    ))
}
