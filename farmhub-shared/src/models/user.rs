/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. A user carries exactly one role; agent and farmer profiles are
/// separate rows that are kept in lockstep with the role inside a transaction
/// (see the `agent` and `farmer` modules).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'agent', 'farmer', 'unassigned');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(254) NOT NULL UNIQUE,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     first_name VARCHAR(150) NOT NULL DEFAULT '',
///     last_name VARCHAR(150) NOT NULL DEFAULT '',
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'unassigned',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The single role a user account holds
///
/// A closed variant instead of independent `is_staff`/`is_agent`/`is_farmer`
/// booleans, so contradictory combinations cannot be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Staff account: full access to every resource
    Admin,

    /// Agent account: administrative helper, manages farms and farmers
    Agent,

    /// Farmer account: owns cows and records within one farm
    Farmer,

    /// Freshly registered account with no profile yet
    Unassigned,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Agent => "agent",
            UserRole::Farmer => "farmer",
            UserRole::Unassigned => "unassigned",
        }
    }

    /// Staff check, the equivalent of the old `is_staff` flag
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, UserRole::Agent)
    }

    pub fn is_farmer(&self) -> bool {
        matches!(self, UserRole::Farmer)
    }

    /// Admin or agent: the pair allowed to manage farms and farmers
    pub fn is_admin_or_agent(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Agent)
    }

    /// Roles allowed to register new users
    pub fn can_register_users(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Agent | UserRole::Farmer)
    }
}

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique, used as the login identifier
    pub email: String,

    /// Username, unique
    pub username: String,

    pub first_name: String,

    pub last_name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// The account's role
    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Public wire shape of a user, embedded in other resources
///
/// Mirrors the fields every profile/record response exposes about its user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic::from(&user)
    }
}

/// Input for creating a new user
///
/// New accounts always start with the `Unassigned` role; promotion happens
/// through agent/farmer profile creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, role, created_at, updated_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email or username already exists (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Sets a user's role
    ///
    /// Takes any executor so profile creation can run this inside the same
    /// transaction as the profile insert.
    ///
    /// # Returns
    ///
    /// True if the user was found and updated
    pub async fn set_role(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
        role: UserRole,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Locks and returns a user row inside a transaction
    ///
    /// Role validation for agent/farmer profile creation reads the target
    /// user under `FOR UPDATE` so the role cannot change between the check
    /// and the profile insert.
    pub async fn find_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Lists users with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_predicates() {
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::Admin.is_admin_or_agent());
        assert!(UserRole::Agent.is_admin_or_agent());
        assert!(!UserRole::Farmer.is_admin_or_agent());
        assert!(!UserRole::Unassigned.is_admin_or_agent());
        assert!(UserRole::Farmer.is_farmer());
        assert!(!UserRole::Agent.is_farmer());
    }

    #[test]
    fn test_registration_gate() {
        assert!(UserRole::Admin.can_register_users());
        assert!(UserRole::Agent.can_register_users());
        assert!(UserRole::Farmer.can_register_users());
        assert!(!UserRole::Unassigned.can_register_users());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Unassigned).unwrap(),
            "\"unassigned\""
        );
        let role: UserRole = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(role, UserRole::Agent);
    }

    #[test]
    fn test_user_public_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            username: "test".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Unassigned,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let public = UserPublic::from(&user);
        assert_eq!(public.id, user.id);
        assert_eq!(public.email, "test@example.com");
    }
}
