/// Farmer endpoints
///
/// # Endpoints
///
/// - `GET  /api/farmers` - List farmer profiles
/// - `POST /api/farmers` - Create a profile (admin/agent)
/// - `GET  /api/farms/:farm_id/farmers` - List one farm's farmers
/// - `POST /api/farms/:farm_id/farmers` - Create within a farm
/// - `GET  /api/farmers/:farmer_id` - Retrieve one profile
/// - `PUT/PATCH /api/farmers/:farmer_id` - Move to another farm (admin/agent)
/// - `DELETE /api/farmers/:farmer_id` - Delete, demoting the user (admin/agent)
///
/// Creating a profile promotes the target user to the farmer role in the
/// same transaction; deleting demotes them back to unassigned.

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
use chrono::{DateTime, Utc};
use farmhub_shared::{
    auth::{
        authorization::{require, require_object, Action, OwnershipFacts, ResourceKind},
        middleware::AuthContext,
    },
    models::{
        farmer::{CreateFarmer, Farmer, FarmerDetail},
        user::UserPublic,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create farmer request
#[derive(Debug, Deserialize)]
pub struct CreateFarmerRequest {
    /// Target user to promote
    pub user_id: Uuid,

    /// Farm to attach to; on nested routes the path segment wins
    pub farm_id: Option<Uuid>,
}

/// Update farmer request
#[derive(Debug, Deserialize)]
pub struct UpdateFarmerRequest {
    pub farm_id: Option<Uuid>,
}

/// Embedded farm reference
#[derive(Debug, Serialize)]
pub struct FarmRef {
    pub id: Uuid,
    pub name: String,
}

/// Farmer response with embedded user and farm
#[derive(Debug, Serialize)]
pub struct FarmerResponse {
    pub id: Uuid,
    pub user: UserPublic,
    pub farm: FarmRef,
    pub created_by: Uuid,
    pub cows_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FarmerDetail> for FarmerResponse {
    fn from(d: FarmerDetail) -> Self {
        Self {
            id: d.id,
            user: UserPublic {
                id: d.user_id,
                username: d.username,
                first_name: d.first_name,
                last_name: d.last_name,
                email: d.email,
            },
            farm: FarmRef {
                id: d.farm_id,
                name: d.farm_name,
            },
            created_by: d.created_by,
            cows_count: d.cows_count,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

async fn list_scoped(
    state: &AppState,
    farm_id: Option<Uuid>,
    pagination: Pagination,
) -> ApiResult<Page<FarmerResponse>> {
    let count = Farmer::count(&state.db, farm_id).await?;
    let results =
        Farmer::list_details(&state.db, farm_id, pagination.limit(), pagination.offset())
            .await?
            .into_iter()
            .map(FarmerResponse::from)
            .collect();

    Ok(Page { count, results })
}

async fn create_with_farm(
    state: &AppState,
    auth: &AuthContext,
    user_id: Uuid,
    farm_id: Uuid,
) -> ApiResult<(StatusCode, Json<FarmerResponse>)> {
    require(auth, Action::Create, ResourceKind::Farmer)?;

    let farmer = Farmer::create(
        &state.db,
        CreateFarmer {
            user_id,
            farm_id,
            created_by: auth.user_id,
        },
    )
    .await?;

    let detail = Farmer::find_detail(&state.db, farmer.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created farmer vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// List all farmer profiles
pub async fn list_farmers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<FarmerResponse>>> {
    require(&auth, Action::Read, ResourceKind::Farmer)?;

    Ok(Json(list_scoped(&state, None, pagination).await?))
}

/// List one farm's farmers
pub async fn list_farm_farmers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farm_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<FarmerResponse>>> {
    require(&auth, Action::Read, ResourceKind::Farmer)?;

    Ok(Json(list_scoped(&state, Some(farm_id), pagination).await?))
}

/// Create a farmer profile
///
/// # Errors
///
/// - `403`: caller is not admin or agent
/// - `400`: target user is an admin, an agent, or already a farmer
/// - `404`: unknown user or farm
pub async fn create_farmer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateFarmerRequest>,
) -> ApiResult<(StatusCode, Json<FarmerResponse>)> {
    let farm_id = req
        .farm_id
        .ok_or_else(|| ApiError::BadRequest("farm_id is required".to_string()))?;

    create_with_farm(&state, &auth, req.user_id, farm_id).await
}

/// Create a farmer profile within a farm (nested route)
///
/// The farm from the path wins over any `farm_id` in the body.
pub async fn create_farm_farmer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farm_id): Path<Uuid>,
    Json(req): Json<CreateFarmerRequest>,
) -> ApiResult<(StatusCode, Json<FarmerResponse>)> {
    create_with_farm(&state, &auth, req.user_id, farm_id).await
}

/// Retrieve one farmer profile
pub async fn get_farmer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
) -> ApiResult<Json<FarmerResponse>> {
    require(&auth, Action::Read, ResourceKind::Farmer)?;

    let detail = Farmer::find_detail(&state.db, farmer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farmer not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Move a farmer to another farm
pub async fn update_farmer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
    Json(req): Json<UpdateFarmerRequest>,
) -> ApiResult<Json<FarmerResponse>> {
    require_object(
        &auth,
        Action::Update,
        ResourceKind::Farmer,
        &OwnershipFacts::default(),
    )?;

    if let Some(farm_id) = req.farm_id {
        Farmer::set_farm(&state.db, farmer_id, farm_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Farmer not found".to_string()))?;
    }

    let detail = Farmer::find_detail(&state.db, farmer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farmer not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Delete a farmer profile, demoting its user back to unassigned
pub async fn delete_farmer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_object(
        &auth,
        Action::Delete,
        ResourceKind::Farmer,
        &OwnershipFacts::default(),
    )?;

    let deleted = Farmer::delete(&state.db, farmer_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Farmer not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
