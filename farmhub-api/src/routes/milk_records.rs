/// Milk record endpoints
///
/// # Endpoints
///
/// - `GET  /api/cows/:cow_id/milk` - List a cow's records
/// - `POST /api/cows/:cow_id/milk` - Record a day's yield
/// - `GET  /api/cows/:cow_id/milk/summary` - Sum/average for one cow
/// - `GET/PUT/PATCH/DELETE /api/cows/:cow_id/milk/:record_id`
/// - `GET  /api/milk/summary` - Record-level summary, filterable
/// - `GET  /api/farmers/:farmer_id/milk/summary` - Farmer-scoped summary
///
/// Farmers reach only their own cows' records; a duplicate (cow, date)
/// insert answers 409 from the unique constraint rather than overwriting.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    pagination::{Page, Pagination},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use farmhub_shared::{
    auth::{
        authorization::{
            require, require_cow_records_access, require_object, Action, OwnershipFacts,
            ResourceKind,
        },
        middleware::AuthContext,
    },
    models::{
        cow::{Cow, CowDetail, CowScope},
        milk_record::{CreateMilkRecord, MilkFilter, MilkRecord, UpdateMilkRecord},
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create milk record request
#[derive(Debug, Deserialize)]
pub struct CreateMilkRecordRequest {
    pub date: NaiveDate,
    pub liters: Decimal,
}

/// Update milk record request; omitted fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateMilkRecordRequest {
    pub date: Option<NaiveDate>,
    pub liters: Option<Decimal>,
}

/// Embedded cow reference
#[derive(Debug, Serialize)]
pub struct CowRef {
    pub id: Uuid,
    pub tag_id: String,
}

/// Milk record response
#[derive(Debug, Serialize)]
pub struct MilkRecordResponse {
    pub id: Uuid,
    pub cow: CowRef,
    pub date: NaiveDate,
    pub liters: Decimal,
    pub recorded_by: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MilkRecordResponse {
    fn new(record: MilkRecord, cow_id: Uuid, cow_tag: &str) -> Self {
        Self {
            id: record.id,
            cow: CowRef {
                id: cow_id,
                tag_id: cow_tag.to_string(),
            },
            date: record.date,
            liters: record.liters,
            recorded_by: record.recorded_by,
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Cow-level summary response
#[derive(Debug, Serialize)]
pub struct CowMilkSummaryResponse {
    pub total_liters: f64,
    pub total_average: f64,

    /// Cow tag, or "Unknown" when the cow can't be resolved
    pub cow: String,

    /// Owning farmer's username, or "Unknown"
    pub farmer: String,
}

/// Record-level summary response
#[derive(Debug, Serialize)]
pub struct MilkSummaryResponse {
    pub total_liters: f64,
    pub total_average: f64,
    pub cow_id: Option<Uuid>,
    pub farmer_id: Option<Uuid>,
}

/// Filters accepted by `GET /api/milk/summary`
#[derive(Debug, Deserialize)]
pub struct MilkSummaryQuery {
    pub cow_id: Option<Uuid>,
    pub farmer_id: Option<Uuid>,
}

/// Loads the addressed cow and checks the caller may touch its records
async fn load_cow_checked(
    state: &AppState,
    auth: &AuthContext,
    cow_id: Uuid,
) -> ApiResult<CowDetail> {
    let cow = Cow::find_detail(&state.db, cow_id, CowScope::default())
        .await?
        .ok_or_else(|| ApiError::NotFound("Cow not found".to_string()))?;

    require_cow_records_access(auth, cow.farmer_user_id)?;

    Ok(cow)
}

/// List a cow's milk records, newest date first
pub async fn list_cow_milk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(cow_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<MilkRecordResponse>>> {
    load_cow_checked(&state, &auth, cow_id).await?;

    let count = MilkRecord::count_for_cow(&state.db, cow_id).await?;
    let results = MilkRecord::list_for_cow(&state.db, cow_id, pagination.limit(), pagination.offset())
        .await?
        .into_iter()
        .map(|d| MilkRecordResponse {
            id: d.id,
            cow: CowRef {
                id: d.cow_id,
                tag_id: d.cow_tag_id,
            },
            date: d.date,
            liters: d.liters,
            recorded_by: d.recorded_by,
            created_by: d.created_by,
            created_at: d.created_at,
            updated_at: d.updated_at,
        })
        .collect();

    Ok(Json(Page { count, results }))
}

/// Record a day's yield for a cow
///
/// # Errors
///
/// - `403`: caller may not touch this cow's records, or has no farmer
///   profile and isn't staff
/// - `409`: a record for this cow and date already exists
pub async fn create_cow_milk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(cow_id): Path<Uuid>,
    Json(req): Json<CreateMilkRecordRequest>,
) -> ApiResult<(StatusCode, Json<MilkRecordResponse>)> {
    let cow = load_cow_checked(&state, &auth, cow_id).await?;
    require(&auth, Action::Create, ResourceKind::MilkRecord)?;

    let record = MilkRecord::create(
        &state.db,
        CreateMilkRecord {
            cow_id,
            date: req.date,
            liters: req.liters,
            recorded_by: auth.user_id,
            created_by: auth.user_id,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MilkRecordResponse::new(record, cow.id, &cow.tag_id)),
    ))
}

/// Sum and average for one cow's records
///
/// Mirrors the original behavior for unknown cows: totals of zero and
/// "Unknown" names instead of a 404.
pub async fn cow_milk_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(cow_id): Path<Uuid>,
) -> ApiResult<Json<CowMilkSummaryResponse>> {
    let cow = Cow::find_detail(&state.db, cow_id, CowScope::default()).await?;

    if let Some(cow) = &cow {
        require_cow_records_access(&auth, cow.farmer_user_id)?;
    }

    let totals = MilkRecord::totals(
        &state.db,
        MilkFilter {
            cow_id: Some(cow_id),
            ..Default::default()
        },
    )
    .await?;

    let (cow_name, farmer_name) = match cow {
        Some(c) => (c.tag_id, c.farmer_username),
        None => ("Unknown".to_string(), "Unknown".to_string()),
    };

    Ok(Json(CowMilkSummaryResponse {
        total_liters: totals.total_liters,
        total_average: totals.total_average,
        cow: cow_name,
        farmer: farmer_name,
    }))
}

/// Retrieve one milk record
pub async fn get_milk_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((cow_id, record_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MilkRecordResponse>> {
    let cow = load_cow_checked(&state, &auth, cow_id).await?;

    let record = MilkRecord::find_by_id(&state.db, record_id)
        .await?
        .filter(|r| r.cow_id == cow_id)
        .ok_or_else(|| ApiError::NotFound("Milk record not found".to_string()))?;

    Ok(Json(MilkRecordResponse::new(record, cow.id, &cow.tag_id)))
}

/// Update a milk record
pub async fn update_milk_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((cow_id, record_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMilkRecordRequest>,
) -> ApiResult<Json<MilkRecordResponse>> {
    let cow = load_cow_checked(&state, &auth, cow_id).await?;

    let record = MilkRecord::find_by_id(&state.db, record_id)
        .await?
        .filter(|r| r.cow_id == cow_id)
        .ok_or_else(|| ApiError::NotFound("Milk record not found".to_string()))?;

    require_object(
        &auth,
        Action::Update,
        ResourceKind::MilkRecord,
        &OwnershipFacts {
            created_by: Some(record.created_by),
            owner_user: Some(cow.farmer_user_id),
        },
    )?;

    let updated = MilkRecord::update(
        &state.db,
        record_id,
        UpdateMilkRecord {
            date: req.date,
            liters: req.liters,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Milk record not found".to_string()))?;

    Ok(Json(MilkRecordResponse::new(updated, cow.id, &cow.tag_id)))
}

/// Delete a milk record
pub async fn delete_milk_record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((cow_id, record_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let cow = load_cow_checked(&state, &auth, cow_id).await?;

    let record = MilkRecord::find_by_id(&state.db, record_id)
        .await?
        .filter(|r| r.cow_id == cow_id)
        .ok_or_else(|| ApiError::NotFound("Milk record not found".to_string()))?;

    require_object(
        &auth,
        Action::Delete,
        ResourceKind::MilkRecord,
        &OwnershipFacts {
            created_by: Some(record.created_by),
            owner_user: Some(cow.farmer_user_id),
        },
    )?;

    MilkRecord::delete(&state.db, record_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Record-level summary with optional filters
///
/// Farmers see totals over their own herd only.
pub async fn milk_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<MilkSummaryQuery>,
) -> ApiResult<Json<MilkSummaryResponse>> {
    require(&auth, Action::Read, ResourceKind::MilkRecord)?;

    let totals = MilkRecord::totals(
        &state.db,
        MilkFilter {
            cow_id: query.cow_id,
            farmer_id: query.farmer_id,
            owner_user_id: auth.has_farmer_profile().then_some(auth.user_id),
        },
    )
    .await?;

    Ok(Json(MilkSummaryResponse {
        total_liters: totals.total_liters,
        total_average: totals.total_average,
        cow_id: query.cow_id,
        farmer_id: query.farmer_id,
    }))
}

/// Farmer-scoped summary (nested route)
pub async fn farmer_milk_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
) -> ApiResult<Json<MilkSummaryResponse>> {
    require(&auth, Action::Read, ResourceKind::MilkRecord)?;

    let totals = MilkRecord::totals(
        &state.db,
        MilkFilter {
            cow_id: None,
            farmer_id: Some(farmer_id),
            owner_user_id: auth.has_farmer_profile().then_some(auth.user_id),
        },
    )
    .await?;

    Ok(Json(MilkSummaryResponse {
        total_liters: totals.total_liters,
        total_average: totals.total_average,
        cow_id: None,
        farmer_id: Some(farmer_id),
    }))
}
