/// Agent profile model and database operations
///
/// An agent is a user with administrative helper duties and contact metadata,
/// not attached to any farm. As with farmers, the profile row and
/// `users.role` move together inside a transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE agents (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     phone VARCHAR(15),
///     locations TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{User, UserRole};

/// Error type for agent profile operations
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Target user is staff
    #[error("Admin users cannot be registered as agents.")]
    AdminUser,

    /// Target user is a farmer
    #[error("Farmers cannot be registered as agents.")]
    FarmerUser,

    /// Target user already holds an agent profile
    #[error("This user is already registered as an agent.")]
    AlreadyRegistered,

    /// Target user does not exist
    #[error("User not found")]
    UserNotFound,

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Agent profile model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agent {
    pub id: Uuid,

    /// The user wearing the agent role (unique)
    pub user_id: Uuid,

    /// Contact phone number
    pub phone: Option<String>,

    /// Free-text list of locations the agent covers
    pub locations: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Agent joined with its user for API responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub locations: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an agent profile
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgent {
    /// Target user to promote to agent
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub locations: String,
}

/// Input for updating an agent profile; only non-None fields are written
///
/// Supplying `user_id` repoints the profile: the old user is demoted to
/// `Unassigned` and the new user promoted, all in one transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAgent {
    pub user_id: Option<Uuid>,
    pub phone: Option<String>,
    pub locations: Option<String>,
}

const AGENT_DETAIL_COLUMNS: &str = "a.id, a.user_id, u.username, u.email, u.first_name, \
     u.last_name, a.phone, a.locations, a.created_at, a.updated_at";

/// Validates that `user` may become an agent
fn check_target_role(user: &User) -> Result<(), AgentError> {
    match user.role {
        UserRole::Admin => Err(AgentError::AdminUser),
        UserRole::Farmer => Err(AgentError::FarmerUser),
        UserRole::Agent => Err(AgentError::AlreadyRegistered),
        UserRole::Unassigned => Ok(()),
    }
}

impl Agent {
    /// Creates an agent profile and promotes the target user to the agent
    /// role in one transaction
    ///
    /// # Errors
    ///
    /// Rejects staff users, farmers, and users who are already agents.
    pub async fn create(pool: &PgPool, data: CreateAgent) -> Result<Self, AgentError> {
        let mut tx = pool.begin().await?;

        let user = User::find_for_update(&mut tx, data.user_id)
            .await?
            .ok_or(AgentError::UserNotFound)?;
        check_target_role(&user)?;

        let agent = sqlx::query_as::<_, Agent>(
            r#"
            INSERT INTO agents (user_id, phone, locations)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, phone, locations, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.phone)
        .bind(data.locations)
        .fetch_one(&mut *tx)
        .await?;

        User::set_role(&mut *tx, data.user_id, UserRole::Agent).await?;

        tx.commit().await?;
        Ok(agent)
    }

    /// Finds an agent profile by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Agent>(
            "SELECT id, user_id, phone, locations, created_at, updated_at FROM agents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds an agent with its user
    pub async fn find_detail(pool: &PgPool, id: Uuid) -> Result<Option<AgentDetail>, sqlx::Error> {
        sqlx::query_as::<_, AgentDetail>(&format!(
            "SELECT {AGENT_DETAIL_COLUMNS} FROM agents a JOIN users u ON u.id = a.user_id WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists agent details, newest first
    pub async fn list_details(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AgentDetail>, sqlx::Error> {
        sqlx::query_as::<_, AgentDetail>(&format!(
            r#"
            SELECT {AGENT_DETAIL_COLUMNS}
            FROM agents a JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts total number of agents
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agents")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates an agent profile
    ///
    /// When `user_id` changes, the old user is demoted and the new user
    /// validated and promoted inside the same transaction.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateAgent,
    ) -> Result<Option<Self>, AgentError> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_as::<_, Agent>(
            "SELECT id, user_id, phone, locations, created_at, updated_at FROM agents WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let new_user_id = match data.user_id {
            Some(user_id) if user_id != current.user_id => {
                let user = User::find_for_update(&mut tx, user_id)
                    .await?
                    .ok_or(AgentError::UserNotFound)?;
                check_target_role(&user)?;

                User::set_role(&mut *tx, current.user_id, UserRole::Unassigned).await?;
                User::set_role(&mut *tx, user_id, UserRole::Agent).await?;
                user_id
            }
            _ => current.user_id,
        };

        let agent = sqlx::query_as::<_, Agent>(
            r#"
            UPDATE agents
            SET user_id = $2,
                phone = COALESCE($3, phone),
                locations = COALESCE($4, locations),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, phone, locations, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(new_user_id)
        .bind(data.phone)
        .bind(data.locations)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(agent))
    }

    /// Deletes an agent profile and demotes its user back to `Unassigned`
    /// in one transaction
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted: Option<(Uuid,)> =
            sqlx::query_as("DELETE FROM agents WHERE id = $1 RETURNING user_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((user_id,)) = deleted else {
            return Ok(false);
        };

        User::set_role(&mut *tx, user_id, UserRole::Unassigned).await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "target@example.com".to_string(),
            username: "target".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plain_user_accepted() {
        assert!(check_target_role(&user_with_role(UserRole::Unassigned)).is_ok());
    }

    #[test]
    fn test_staff_rejected() {
        let err = check_target_role(&user_with_role(UserRole::Admin)).unwrap_err();
        assert_eq!(err.to_string(), "Admin users cannot be registered as agents.");
    }

    #[test]
    fn test_farmer_rejected() {
        let err = check_target_role(&user_with_role(UserRole::Farmer)).unwrap_err();
        assert_eq!(err.to_string(), "Farmers cannot be registered as agents.");
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let err = check_target_role(&user_with_role(UserRole::Agent)).unwrap_err();
        assert_eq!(err.to_string(), "This user is already registered as an agent.");
    }
}
