/// Database models for FarmHub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with a single role variant (admin/agent/farmer/unassigned)
/// - `agent`: Agent profiles (1:1 with users, contact metadata)
/// - `farm`: Farms owned by a creating user
/// - `farmer`: Farmer profiles attached to exactly one farm
/// - `cow`: Cows attached to exactly one farmer, globally unique tag
/// - `milk_record`: Daily per-cow milk yield, unique per (cow, date)
/// - `activity`: Free-text log entries attributed to a farmer
/// - `revoked_token`: Refresh-token blacklist backing logout
///
/// # Example
///
/// ```no_run
/// use farmhub_shared::models::user::{User, CreateUser};
/// use farmhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "farmer@example.com".to_string(),
///     username: "farmer1".to_string(),
///     first_name: "Jane".to_string(),
///     last_name: "Doe".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod activity;
pub mod agent;
pub mod cow;
pub mod farm;
pub mod farmer;
pub mod milk_record;
pub mod revoked_token;
pub mod user;
