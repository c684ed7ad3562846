/// Activity endpoints
///
/// # Endpoints
///
/// - `GET  /api/activities` - List, newest first
/// - `POST /api/activities` - Create (admin or farmer profile)
/// - `GET  /api/farms/:farm_id/activities` - One farm's activities
/// - `GET  /api/farmers/:farmer_id/activities` - One farmer's activities
/// - `POST /api/farmers/:farmer_id/activities` - Create for a farmer
/// - `GET/PUT/PATCH/DELETE /api/activities/:activity_id`
///
/// The acting user and creator are stamped from the caller, never taken
/// from the body.

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
        activity::{Activity, ActivityDetail, ActivityScope, CreateActivity},
        farmer::Farmer,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create activity request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityRequest {
    /// Farmer the entry is about; on nested routes the path segment wins
    pub farmer_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Description is required."))]
    pub description: String,
}

/// Update activity request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 255, message = "Description is required."))]
    pub description: String,
}

/// Embedded user reference
#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

/// Activity response with denormalized names
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub farmer: UserRef,
    pub actor: Option<UserRef>,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ActivityDetail> for ActivityResponse {
    fn from(d: ActivityDetail) -> Self {
        Self {
            id: d.id,
            farmer: UserRef {
                id: d.farmer_id,
                username: d.farmer_username,
            },
            actor: match (d.actor_id, d.actor_username) {
                (Some(id), Some(username)) => Some(UserRef { id, username }),
                _ => None,
            },
            description: d.description,
            created_by: d.created_by,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

async fn list_scoped(
    state: &AppState,
    scope: ActivityScope,
    pagination: Pagination,
) -> ApiResult<Page<ActivityResponse>> {
    let count = Activity::count(&state.db, scope).await?;
    let results =
        Activity::list_details(&state.db, scope, pagination.limit(), pagination.offset())
            .await?
            .into_iter()
            .map(ActivityResponse::from)
            .collect();

    Ok(Page { count, results })
}

async fn create_for(
    state: &AppState,
    auth: &AuthContext,
    description: String,
    farmer_id: Uuid,
) -> ApiResult<(StatusCode, Json<ActivityResponse>)> {
    require(auth, Action::Create, ResourceKind::Activity)?;

    if Farmer::find_by_id(&state.db, farmer_id).await?.is_none() {
        return Err(ApiError::NotFound("Farmer not found".to_string()));
    }

    let activity = Activity::create(
        &state.db,
        CreateActivity {
            farmer_id,
            actor_id: auth.user_id,
            description,
            created_by: auth.user_id,
        },
    )
    .await?;

    let detail = Activity::find_detail(&state.db, activity.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created activity vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// List activities, newest first
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<ActivityResponse>>> {
    require(&auth, Action::Read, ResourceKind::Activity)?;

    Ok(Json(list_scoped(&state, ActivityScope::default(), pagination).await?))
}

/// List one farm's activities
pub async fn list_farm_activities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farm_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<ActivityResponse>>> {
    require(&auth, Action::Read, ResourceKind::Activity)?;

    let scope = ActivityScope {
        farm_id: Some(farm_id),
        ..Default::default()
    };
    Ok(Json(list_scoped(&state, scope, pagination).await?))
}

/// List one farmer's activities
pub async fn list_farmer_activities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<ActivityResponse>>> {
    require(&auth, Action::Read, ResourceKind::Activity)?;

    let scope = ActivityScope {
        farmer_id: Some(farmer_id),
        ..Default::default()
    };
    Ok(Json(list_scoped(&state, scope, pagination).await?))
}

/// Create an activity
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateActivityRequest>,
) -> ApiResult<(StatusCode, Json<ActivityResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let farmer_id = req
        .farmer_id
        .ok_or_else(|| ApiError::BadRequest("farmer_id is required".to_string()))?;

    create_for(&state, &auth, req.description, farmer_id).await
}

/// Create an activity for a farmer (nested route)
pub async fn create_farmer_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(farmer_id): Path<Uuid>,
    Json(req): Json<CreateActivityRequest>,
) -> ApiResult<(StatusCode, Json<ActivityResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    create_for(&state, &auth, req.description, farmer_id).await
}

/// Retrieve one activity
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(activity_id): Path<Uuid>,
) -> ApiResult<Json<ActivityResponse>> {
    require(&auth, Action::Read, ResourceKind::Activity)?;

    let detail = Activity::find_detail(&state.db, activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Update an activity's description
pub async fn update_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(activity_id): Path<Uuid>,
    Json(req): Json<UpdateActivityRequest>,
) -> ApiResult<Json<ActivityResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let detail = Activity::find_detail(&state.db, activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    require_object(
        &auth,
        Action::Update,
        ResourceKind::Activity,
        &OwnershipFacts {
            created_by: Some(detail.created_by),
            owner_user: Some(detail.farmer_user_id),
        },
    )?;

    Activity::update_description(&state.db, activity_id, req.description)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    let detail = Activity::find_detail(&state.db, activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Delete an activity
pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(activity_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let detail = Activity::find_detail(&state.db, activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    require_object(
        &auth,
        Action::Delete,
        ResourceKind::Activity,
        &OwnershipFacts {
            created_by: Some(detail.created_by),
            owner_user: Some(detail.farmer_user_id),
        },
    )?;

    Activity::delete(&state.db, activity_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
