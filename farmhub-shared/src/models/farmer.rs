/// Farmer profile model and database operations
///
/// A farmer is a user attached to exactly one farm. Creating, repointing, or
/// deleting the profile changes `users.role` in the same transaction, so the
/// role and the profile row can never disagree after a partial failure.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE farmers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     farm_id UUID NOT NULL REFERENCES farms(id) ON DELETE CASCADE,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{User, UserRole};

/// Error type for farmer profile operations
///
/// The rejection messages match the API's client-facing validation errors.
#[derive(Debug, thiserror::Error)]
pub enum FarmerError {
    /// Target user already holds a farmer profile
    #[error("User {0} is already registered as a farmer.")]
    AlreadyFarmer(String),

    /// Target user is an agent
    #[error("User {0} is an agent and cannot be registered as a farmer.")]
    AgentUser(String),

    /// Target user is staff
    #[error("Admin users cannot be registered as farmers.")]
    AdminUser,

    /// Target user does not exist
    #[error("User not found")]
    UserNotFound,

    /// Target farm does not exist
    #[error("Farm not found")]
    FarmNotFound,

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Farmer profile model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Farmer {
    pub id: Uuid,

    /// The user wearing the farmer role (unique)
    pub user_id: Uuid,

    /// The farm this farmer belongs to
    pub farm_id: Uuid,

    /// User who created the profile
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Farmer joined with its user, farm, and cow count for API responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FarmerDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub created_by: Uuid,
    pub cows_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a farmer profile
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFarmer {
    /// Target user to promote to farmer
    pub user_id: Uuid,
    pub farm_id: Uuid,
    pub created_by: Uuid,
}

const FARMER_DETAIL_COLUMNS: &str = "fr.id, fr.user_id, u.username, u.email, u.first_name, \
     u.last_name, fr.farm_id, f.name AS farm_name, fr.created_by, \
     (SELECT COUNT(*) FROM cows WHERE farmer_id = fr.id) AS cows_count, \
     fr.created_at, fr.updated_at";

const FARMER_DETAIL_FROM: &str =
    "FROM farmers fr JOIN users u ON u.id = fr.user_id JOIN farms f ON f.id = fr.farm_id";

/// Validates that `user` may become a farmer
fn check_target_role(user: &User) -> Result<(), FarmerError> {
    match user.role {
        UserRole::Farmer => Err(FarmerError::AlreadyFarmer(user.email.clone())),
        UserRole::Agent => Err(FarmerError::AgentUser(user.email.clone())),
        UserRole::Admin => Err(FarmerError::AdminUser),
        UserRole::Unassigned => Ok(()),
    }
}

impl Farmer {
    /// Creates a farmer profile and promotes the target user to the farmer
    /// role in one transaction
    ///
    /// The target user row is locked (`FOR UPDATE`) before validation, so a
    /// concurrent agent registration for the same user cannot slip between
    /// the role check and the insert.
    ///
    /// # Errors
    ///
    /// Rejects admins, agents, and users who already hold a farmer profile.
    pub async fn create(pool: &PgPool, data: CreateFarmer) -> Result<Self, FarmerError> {
        let mut tx = pool.begin().await?;

        let user = User::find_for_update(&mut tx, data.user_id)
            .await?
            .ok_or(FarmerError::UserNotFound)?;
        check_target_role(&user)?;

        let farm_exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM farms WHERE id = $1")
                .bind(data.farm_id)
                .fetch_optional(&mut *tx)
                .await?;
        if farm_exists.is_none() {
            return Err(FarmerError::FarmNotFound);
        }

        let farmer = sqlx::query_as::<_, Farmer>(
            r#"
            INSERT INTO farmers (user_id, farm_id, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, farm_id, created_by, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.farm_id)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await?;

        User::set_role(&mut *tx, data.user_id, UserRole::Farmer).await?;

        tx.commit().await?;
        Ok(farmer)
    }

    /// Finds a farmer profile by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>(
            "SELECT id, user_id, farm_id, created_by, created_at, updated_at FROM farmers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds the farmer profile belonging to a user, if any
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>(
            "SELECT id, user_id, farm_id, created_by, created_at, updated_at FROM farmers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a farmer with its user, farm, and cow count
    pub async fn find_detail(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<FarmerDetail>, sqlx::Error> {
        sqlx::query_as::<_, FarmerDetail>(&format!(
            "SELECT {FARMER_DETAIL_COLUMNS} {FARMER_DETAIL_FROM} WHERE fr.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists farmer details, optionally restricted to one farm, newest first
    pub async fn list_details(
        pool: &PgPool,
        farm_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FarmerDetail>, sqlx::Error> {
        sqlx::query_as::<_, FarmerDetail>(&format!(
            r#"
            SELECT {FARMER_DETAIL_COLUMNS} {FARMER_DETAIL_FROM}
            WHERE ($1::uuid IS NULL OR fr.farm_id = $1)
            ORDER BY fr.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(farm_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts farmers, optionally restricted to one farm
    pub async fn count(pool: &PgPool, farm_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM farmers WHERE ($1::uuid IS NULL OR farm_id = $1)")
                .bind(farm_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Moves a farmer to another farm
    pub async fn set_farm(
        pool: &PgPool,
        id: Uuid,
        farm_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>(
            r#"
            UPDATE farmers SET farm_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, farm_id, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(farm_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a farmer profile and demotes its user back to `Unassigned`
    /// in one transaction
    ///
    /// # Returns
    ///
    /// True if the profile was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted: Option<(Uuid,)> =
            sqlx::query_as("DELETE FROM farmers WHERE id = $1 RETURNING user_id")
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
    fn test_unassigned_user_accepted() {
        assert!(check_target_role(&user_with_role(UserRole::Unassigned)).is_ok());
    }

    #[test]
    fn test_admin_rejected() {
        let err = check_target_role(&user_with_role(UserRole::Admin)).unwrap_err();
        assert_eq!(err.to_string(), "Admin users cannot be registered as farmers.");
    }

    #[test]
    fn test_agent_rejected_with_email() {
        let err = check_target_role(&user_with_role(UserRole::Agent)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User target@example.com is an agent and cannot be registered as a farmer."
        );
    }

    #[test]
    fn test_existing_farmer_rejected() {
        let err = check_target_role(&user_with_role(UserRole::Farmer)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User target@example.com is already registered as a farmer."
        );
    }
}
