/// Farm endpoints
///
/// # Endpoints
///
/// - `GET  /api/farms` - List farms (any authenticated user)
/// - `POST /api/farms` - Create a farm (admin/agent)
/// - `GET  /api/farms/:farm_id` - Retrieve one farm
/// - `PUT/PATCH /api/farms/:farm_id` - Update (admin/agent)
/// - `DELETE /api/farms/:farm_id` - Delete, cascading (admin/agent)
///
/// Farm responses carry a `farmers_count` alongside the row.

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
use farmhub_shared::{
    auth::{
        authorization::{require, require_object, Action, OwnershipFacts, ResourceKind},
        middleware::AuthContext,
    },
    models::farm::{CreateFarm, Farm, FarmWithStats, UpdateFarm},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create farm request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFarmRequest {
    #[validate(length(min = 1, max = 255, message = "Farm name is required."))]
    pub name: String,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub location: String,
}

/// Update farm request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFarmRequest {
    #[validate(length(min = 1, max = 255, message = "Farm name is required."))]
    pub name: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,
}

/// List farms with farmer counts
pub async fn list_farms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<FarmWithStats>>> {
    require(&auth, Action::Read, ResourceKind::Farm)?;

    let count = Farm::count(&state.db).await?;
    let results =
        Farm::list_with_stats(&state.db, pagination.limit(), pagination.offset()).await?;

    Ok(Json(Page { count, results }))
}

/// Create a farm
pub async fn create_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateFarmRequest>,
) -> ApiResult<(StatusCode, Json<FarmWithStats>)> {
    require(&auth, Action::Create, ResourceKind::Farm)?;
    req.validate().map_err(ApiError::from_validation)?;

    let farm = Farm::create(
        &state.db,
        CreateFarm {
            name: req.name,
            location: req.location,
            created_by: auth.user_id,
        },
    )
    .await?;

    let detail = Farm::find_with_stats(&state.db, farm.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created farm vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Retrieve one farm
pub async fn get_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farm_id): Path<Uuid>,
) -> ApiResult<Json<FarmWithStats>> {
    require(&auth, Action::Read, ResourceKind::Farm)?;

    let farm = Farm::find_with_stats(&state.db, farm_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm not found".to_string()))?;

    Ok(Json(farm))
}

/// Update a farm
pub async fn update_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farm_id): Path<Uuid>,
    Json(req): Json<UpdateFarmRequest>,
) -> ApiResult<Json<FarmWithStats>> {
    require_object(
        &auth,
        Action::Update,
        ResourceKind::Farm,
        &OwnershipFacts::default(),
    )?;
    req.validate().map_err(ApiError::from_validation)?;

    let updated = Farm::update(
        &state.db,
        farm_id,
        UpdateFarm {
            name: req.name,
            location: req.location,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Farm not found".to_string()))?;

    let detail = Farm::find_with_stats(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm not found".to_string()))?;

    Ok(Json(detail))
}

/// Delete a farm, cascading to farmers, cows, milk records, and activities
pub async fn delete_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farm_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_object(
        &auth,
        Action::Delete,
        ResourceKind::Farm,
        &OwnershipFacts::default(),
    )?;

    let deleted = Farm::delete(&state.db, farm_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Farm not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
