/// Authentication middleware support for Axum
///
/// This module provides the pieces the API server's auth layer is built
/// from: Bearer-token extraction, the `AuthContext` stored in request
/// extensions, and the error type the layer maps to HTTP responses.
///
/// The context is loaded fresh from the database on every request, so
/// role changes take effect before the next token issuance.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use farmhub_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {} ({})", auth.user_id, auth.role.as_str())
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::farmer::Farmer;
use crate::models::user::{User, UserRole};

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token subject no longer exists
    UnknownUser,

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::UnknownUser => {
                (StatusCode::UNAUTHORIZED, "Unknown user").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// The requester's farmer profile, when they have one
///
/// Carried in the auth context so ownership checks don't re-query per
/// handler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FarmerIdentity {
    /// Farmer profile ID
    pub farmer_id: Uuid,

    /// Farm the profile belongs to
    pub farm_id: Uuid,
}

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// The user's current role, read from the database per request
    pub role: UserRole,

    /// Farmer profile, present iff the user has one
    pub farmer: Option<FarmerIdentity>,
}

impl AuthContext {
    /// Loads the auth context for a validated token subject
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownUser` when the subject has been deleted
    /// since the token was issued.
    pub async fn load(pool: &PgPool, user_id: Uuid) -> Result<Self, AuthError> {
        let user = User::find_by_id(pool, user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UnknownUser)?;

        let farmer = Farmer::find_by_user(pool, user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .map(|f: Farmer| FarmerIdentity {
                farmer_id: f.id,
                farm_id: f.farm_id,
            });

        Ok(Self {
            user_id: user.id,
            role: user.role,
            farmer,
        })
    }

    /// True when the requester holds a farmer profile
    pub fn has_farmer_profile(&self) -> bool {
        self.farmer.is_some()
    }
}

/// Extracts the Bearer token from the Authorization header
///
/// # Errors
///
/// - `MissingCredentials` when the header is absent
/// - `InvalidFormat` when it isn't a Bearer token
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_non_bearer_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_farmer_profile_flag() {
        let ctx = AuthContext {
            user_id: Uuid::new_v4(),
            role: UserRole::Farmer,
            farmer: Some(FarmerIdentity {
                farmer_id: Uuid::new_v4(),
                farm_id: Uuid::new_v4(),
            }),
        };
        assert!(ctx.has_farmer_profile());

        let ctx = AuthContext {
            user_id: Uuid::new_v4(),
            role: UserRole::Agent,
            farmer: None,
        };
        assert!(!ctx.has_farmer_profile());
    }
}
