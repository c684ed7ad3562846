/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new user (role-gated)
/// - `POST /api/auth/jwt/create` - Login and get a token pair
/// - `POST /api/auth/jwt/refresh` - Refresh an access token
/// - `POST /api/auth/jwt/verify` - Validate a token
/// - `POST /api/auth/logout` - Blacklist a refresh token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use farmhub_shared::{
    auth::{
        jwt::{self, Claims, TokenType},
        middleware::AuthContext,
        password,
    },
    models::{
        revoked_token::RevokedToken,
        user::{CreateUser, User, UserPublic},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username, 150 characters or fewer
    #[validate(length(min = 1, max = 150, message = "Username cannot be more than 150 characters."))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(max = 150))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(max = 150))]
    #[serde(default)]
    pub last_name: String,

    /// Password, at least 6 characters
    #[validate(length(min = 6, message = "Password must be at least 6 characters long."))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    pub password: String,
}

/// Token pair response, the login payload
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    /// Refresh token (1 day)
    pub refresh: String,

    /// Access token (60 minutes)
    pub access: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub access: String,
}

/// Verify request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Logout request
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Register a new user
///
/// Only staff, agents, and farmers may register users; new accounts start
/// with the `unassigned` role and are promoted through profile creation.
///
/// # Errors
///
/// - `403`: caller's role may not register users
/// - `400`: duplicate email or username
/// - `422`: field validation failed
pub async fn register(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserPublic>> {
    if !auth.role.can_register_users() {
        return Err(ApiError::Forbidden(
            "Only administrators, agents, and farmers can register new users.".to_string(),
        ));
    }

    req.validate().map_err(ApiError::from_validation)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest(
            "A user with this email already exists.".to_string(),
        ));
    }
    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "A user with this username already exists.".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        },
    )
    .await?;

    Ok(Json(UserPublic::from(user)))
}

/// Login endpoint
///
/// Authenticates a user by email and password and returns a token pair.
///
/// # Errors
///
/// - `401`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("No active account found with the given credentials".to_string())
        })?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "No active account found with the given credentials".to_string(),
        ));
    }

    let access_claims = Claims::new(user.id, TokenType::Access);
    let refresh_claims = Claims::new(user.id, TokenType::Refresh);

    let access = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(TokenPairResponse { refresh, access }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token. Blacklisted tokens
/// (logged out) are rejected.
///
/// # Errors
///
/// - `401`: invalid, expired, or blacklisted refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh, state.jwt_secret())?;

    if RevokedToken::is_revoked(&state.db, claims.jti).await? {
        return Err(ApiError::Unauthorized(
            "Token is blacklisted".to_string(),
        ));
    }

    let access_claims = Claims::new(claims.sub, TokenType::Access);
    let access = jwt::create_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access }))
}

/// Token verify endpoint
///
/// Returns 200 with an empty object when the supplied token (of either
/// type) validates.
///
/// # Errors
///
/// - `401`: signature, expiry, or issuer check failed
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    jwt::validate_token(&req.token, state.jwt_secret())?;

    Ok(Json(serde_json::json!({})))
}

/// Logout endpoint
///
/// Blacklists the supplied refresh token so it can no longer mint access
/// tokens. Requires an authenticated caller.
///
/// # Errors
///
/// - `400`: missing or invalid refresh token
pub async fn logout(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<LogoutRequest>,
) -> ApiResult<StatusCode> {
    let Some(refresh_token) = req.refresh else {
        return Err(ApiError::BadRequest("refresh token required".to_string()));
    };

    let claims = jwt::validate_refresh_token(&refresh_token, state.jwt_secret())
        .map_err(|_| ApiError::BadRequest("invalid token".to_string()))?;

    RevokedToken::revoke(&state.db, claims.jti, claims.expires_at()).await?;

    Ok(StatusCode::RESET_CONTENT)
}
