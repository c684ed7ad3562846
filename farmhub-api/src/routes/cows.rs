/// Cow endpoints
///
/// # Endpoints
///
/// - `GET  /api/cows` - List cows (farmers see only their own herd)
/// - `POST /api/cows` - Create a cow
/// - `GET  /api/farmers/:farmer_id/cows` - List one farmer's cows
/// - `POST /api/farmers/:farmer_id/cows` - Create within a farmer
/// - `GET  /api/cows/:cow_id` - Retrieve (404 outside the caller's scope)
/// - `PUT/PATCH /api/cows/:cow_id` - Update (admin, creator, or owner)
/// - `DELETE /api/cows/:cow_id` - Delete, cascading to milk records
///
/// A caller with a farmer profile always has new cows assigned to that
/// profile, whatever `farmer_id` the body carries; admins must name the
/// farmer explicitly.

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
        authorization::{require, require_object, Action, OwnershipFacts, ResourceKind},
        middleware::AuthContext,
    },
    models::{
        cow::{Cow, CowDetail, CowScope, CreateCow, UpdateCow},
        farmer::Farmer,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create cow request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCowRequest {
    #[validate(length(min = 1, max = 64, message = "Tag ID is required."))]
    pub tag_id: String,

    /// Ignored for callers with a farmer profile
    pub farmer_id: Option<Uuid>,

    pub birth_date: Option<NaiveDate>,
}

/// Update cow request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCowRequest {
    #[validate(length(min = 1, max = 64, message = "Tag ID is required."))]
    pub tag_id: Option<String>,

    pub birth_date: Option<NaiveDate>,
}

/// Embedded farmer reference
#[derive(Debug, Serialize)]
pub struct FarmerRef {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub farm_id: Uuid,
    pub farm_name: String,
}

/// Cow response with embedded farmer
#[derive(Debug, Serialize)]
pub struct CowResponse {
    pub id: Uuid,
    pub tag_id: String,
    pub birth_date: Option<NaiveDate>,
    pub farmer: FarmerRef,
    pub created_by: Uuid,
    pub milk_records_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CowDetail> for CowResponse {
    fn from(d: CowDetail) -> Self {
        Self {
            id: d.id,
            tag_id: d.tag_id,
            birth_date: d.birth_date,
            farmer: FarmerRef {
                id: d.farmer_id,
                user_id: d.farmer_user_id,
                username: d.farmer_username,
                farm_id: d.farm_id,
                farm_name: d.farm_name,
            },
            created_by: d.created_by,
            milk_records_count: d.milk_records_count,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// Visibility scope for the caller: farmers only ever see their own herd
fn scope_for(auth: &AuthContext, farmer_id: Option<Uuid>) -> CowScope {
    CowScope {
        farmer_id,
        owner_user_id: auth.has_farmer_profile().then_some(auth.user_id),
    }
}

async fn list_scoped(
    state: &AppState,
    scope: CowScope,
    pagination: Pagination,
) -> ApiResult<Page<CowResponse>> {
    let count = Cow::count(&state.db, scope).await?;
    let results = Cow::list_details(&state.db, scope, pagination.limit(), pagination.offset())
        .await?
        .into_iter()
        .map(CowResponse::from)
        .collect();

    Ok(Page { count, results })
}

async fn create_for(
    state: &AppState,
    auth: &AuthContext,
    req: CreateCowRequest,
    path_farmer_id: Option<Uuid>,
) -> ApiResult<(StatusCode, Json<CowResponse>)> {
    require(auth, Action::Create, ResourceKind::Cow)?;
    req.validate().map_err(ApiError::from_validation)?;

    // Farmers always register into their own herd
    let farmer_id = if let Some(profile) = &auth.farmer {
        profile.farmer_id
    } else {
        path_farmer_id.or(req.farmer_id).ok_or_else(|| {
            ApiError::BadRequest("Farmer ID is required for admin and agents".to_string())
        })?
    };

    if Farmer::find_by_id(&state.db, farmer_id).await?.is_none() {
        return Err(ApiError::NotFound("Farmer not found".to_string()));
    }

    let cow = Cow::create(
        &state.db,
        CreateCow {
            tag_id: req.tag_id,
            farmer_id,
            birth_date: req.birth_date,
            created_by: auth.user_id,
        },
    )
    .await?;

    let detail = Cow::find_detail(&state.db, cow.id, CowScope::default())
        .await?
        .ok_or_else(|| ApiError::InternalError("Created cow vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// List cows visible to the caller
pub async fn list_cows(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<CowResponse>>> {
    require(&auth, Action::Read, ResourceKind::Cow)?;

    Ok(Json(list_scoped(&state, scope_for(&auth, None), pagination).await?))
}

/// List one farmer's cows
pub async fn list_farmer_cows(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<CowResponse>>> {
    require(&auth, Action::Read, ResourceKind::Cow)?;

    Ok(Json(
        list_scoped(&state, scope_for(&auth, Some(farmer_id)), pagination).await?,
    ))
}

/// Create a cow
pub async fn create_cow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCowRequest>,
) -> ApiResult<(StatusCode, Json<CowResponse>)> {
    create_for(&state, &auth, req, None).await
}

/// Create a cow under a farmer (nested route)
pub async fn create_farmer_cow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
    Json(req): Json<CreateCowRequest>,
) -> ApiResult<(StatusCode, Json<CowResponse>)> {
    create_for(&state, &auth, req, Some(farmer_id)).await
}

/// Retrieve one cow
///
/// A farmer asking for a foreign cow gets 404: the row sits outside their
/// visibility scope.
pub async fn get_cow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(cow_id): Path<Uuid>,
) -> ApiResult<Json<CowResponse>> {
    require(&auth, Action::Read, ResourceKind::Cow)?;

    let detail = Cow::find_detail(&state.db, cow_id, scope_for(&auth, None))
        .await?
        .ok_or_else(|| ApiError::NotFound("Cow not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Update a cow
pub async fn update_cow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(cow_id): Path<Uuid>,
    Json(req): Json<UpdateCowRequest>,
) -> ApiResult<Json<CowResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let detail = Cow::find_detail(&state.db, cow_id, scope_for(&auth, None))
        .await?
        .ok_or_else(|| ApiError::NotFound("Cow not found".to_string()))?;

    require_object(
        &auth,
        Action::Update,
        ResourceKind::Cow,
        &OwnershipFacts {
            created_by: Some(detail.created_by),
            owner_user: Some(detail.farmer_user_id),
        },
    )?;

    Cow::update(
        &state.db,
        cow_id,
        UpdateCow {
            tag_id: req.tag_id,
            birth_date: req.birth_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Cow not found".to_string()))?;

    let detail = Cow::find_detail(&state.db, cow_id, CowScope::default())
        .await?
        .ok_or_else(|| ApiError::NotFound("Cow not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Delete a cow, cascading to its milk records
pub async fn delete_cow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(cow_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let detail = Cow::find_detail(&state.db, cow_id, scope_for(&auth, None))
        .await?
        .ok_or_else(|| ApiError::NotFound("Cow not found".to_string()))?;

    require_object(
        &auth,
        Action::Delete,
        ResourceKind::Cow,
        &OwnershipFacts {
            created_by: Some(detail.created_by),
            owner_user: Some(detail.farmer_user_id),
        },
    )?;

    Cow::delete(&state.db, cow_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
