/// Agent endpoints (admin only)
///
/// # Endpoints
///
/// - `GET  /api/agents` - List agent profiles
/// - `POST /api/agents` - Register a user as an agent
/// - `GET  /api/agents/:agent_id` - Retrieve one profile
/// - `PUT/PATCH /api/agents/:agent_id` - Update contact data or repoint
/// - `DELETE /api/agents/:agent_id` - Delete, demoting the user
///
/// Every action requires the staff role. Creating a profile promotes the
/// target user to the agent role in the same transaction.

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
        authorization::{require, Action, ResourceKind},
        middleware::AuthContext,
    },
    models::{
        agent::{Agent, AgentDetail, CreateAgent, UpdateAgent},
        user::UserPublic,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create agent request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgentRequest {
    /// Target user to promote
    pub user_id: Uuid,

    #[validate(length(max = 15, message = "Phone number cannot exceed 15 characters."))]
    pub phone: Option<String>,

    #[serde(default)]
    pub locations: String,
}

/// Update agent request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAgentRequest {
    /// Supplying a different user repoints the profile
    pub user_id: Option<Uuid>,

    #[validate(length(max = 15, message = "Phone number cannot exceed 15 characters."))]
    pub phone: Option<String>,

    pub locations: Option<String>,
}

/// Agent response with embedded user
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub id: Uuid,
    pub user: UserPublic,
    pub phone: Option<String>,
    pub locations: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AgentDetail> for AgentResponse {
    fn from(d: AgentDetail) -> Self {
        Self {
            id: d.id,
            user: UserPublic {
                id: d.user_id,
                username: d.username,
                first_name: d.first_name,
                last_name: d.last_name,
                email: d.email,
            },
            phone: d.phone,
            locations: d.locations,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// List agent profiles
pub async fn list_agents(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<AgentResponse>>> {
    require(&auth, Action::Read, ResourceKind::Agent)?;

    let count = Agent::count(&state.db).await?;
    let results = Agent::list_details(&state.db, pagination.limit(), pagination.offset())
        .await?
        .into_iter()
        .map(AgentResponse::from)
        .collect();

    Ok(Json(Page { count, results }))
}

/// Register a user as an agent
///
/// # Errors
///
/// - `403`: caller is not staff
/// - `400`: target is staff, a farmer, or already an agent
/// - `404`: unknown target user
pub async fn create_agent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateAgentRequest>,
) -> ApiResult<(StatusCode, Json<AgentResponse>)> {
    require(&auth, Action::Create, ResourceKind::Agent)?;
    req.validate().map_err(ApiError::from_validation)?;

    let agent = Agent::create(
        &state.db,
        CreateAgent {
            user_id: req.user_id,
            phone: req.phone,
            locations: req.locations,
        },
    )
    .await?;

    let detail = Agent::find_detail(&state.db, agent.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created agent vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// Retrieve one agent profile
pub async fn get_agent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(agent_id): Path<Uuid>,
) -> ApiResult<Json<AgentResponse>> {
    require(&auth, Action::Read, ResourceKind::Agent)?;

    let detail = Agent::find_detail(&state.db, agent_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Update an agent profile
pub async fn update_agent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(agent_id): Path<Uuid>,
    Json(req): Json<UpdateAgentRequest>,
) -> ApiResult<Json<AgentResponse>> {
    require(&auth, Action::Update, ResourceKind::Agent)?;
    req.validate().map_err(ApiError::from_validation)?;

    let updated = Agent::update(
        &state.db,
        agent_id,
        UpdateAgent {
            user_id: req.user_id,
            phone: req.phone,
            locations: req.locations,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))?;

    let detail = Agent::find_detail(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))?;

    Ok(Json(detail.into()))
}

/// Delete an agent profile, demoting its user back to unassigned
pub async fn delete_agent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(agent_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require(&auth, Action::Delete, ResourceKind::Agent)?;

    let deleted = Agent::delete(&state.db, agent_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Agent not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
