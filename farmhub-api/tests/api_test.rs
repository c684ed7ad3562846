/// Integration tests for the FarmHub API
///
/// These exercise the full router against a real Postgres database:
/// role-gated profile creation, ownership scoping, duplicate-record
/// conflicts, and cascade deletes. Set `TEST_DATABASE_URL` to run them.

mod common;

use axum::http::StatusCode;
use common::{call, TestContext};
use farmhub_shared::auth::password::hash_password;
use farmhub_shared::models::user::{CreateUser, User, UserRole};
use serde_json::json;
use uuid::Uuid;

/// Creating an Agent from staff or farmer targets must be rejected; a
/// plain user gets promoted to the agent role.
#[tokio::test]
async fn test_agent_registration_rules() {
    let Some(ctx) = TestContext::new().await else { return };

    let (_admin, admin_token) = ctx.user_with_role(UserRole::Admin).await;

    // Plain target: accepted, role flips to agent
    let (target, _) = ctx.user_with_role(UserRole::Unassigned).await;
    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/agents",
        Some(&admin_token),
        Some(json!({ "user_id": target.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let target = User::find_by_id(&ctx.db, target.id).await.unwrap().unwrap();
    assert_eq!(target.role, UserRole::Agent);

    // Staff target: rejected
    let (staff_target, _) = ctx.user_with_role(UserRole::Admin).await;
    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/agents",
        Some(&admin_token),
        Some(json!({ "user_id": staff_target.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Admin users cannot be registered as agents.");

    // Farmer target: rejected
    let farm = ctx.farm(staff_target.id).await;
    let (farmer_user, _, _) = ctx.farmer_in(farm.id, staff_target.id).await;
    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/agents",
        Some(&admin_token),
        Some(json!({ "user_id": farmer_user.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Farmers cannot be registered as agents.");
}

/// Only admins and agents may create farmer profiles.
#[tokio::test]
async fn test_farmer_creation_requires_admin_or_agent() {
    let Some(ctx) = TestContext::new().await else { return };

    let (admin, _) = ctx.user_with_role(UserRole::Admin).await;
    let farm = ctx.farm(admin.id).await;
    let (target, _) = ctx.user_with_role(UserRole::Unassigned).await;

    // Unassigned caller: 403 regardless of target
    let (_, plain_token) = ctx.user_with_role(UserRole::Unassigned).await;
    let (status, _) = call(
        &ctx.app,
        "POST",
        "/api/farmers",
        Some(&plain_token),
        Some(json!({ "user_id": target.id, "farm_id": farm.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Agent caller: accepted
    let (_, _, agent_token) = ctx.agent().await;
    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/farmers",
        Some(&agent_token),
        Some(json!({ "user_id": target.id, "farm_id": farm.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let target = User::find_by_id(&ctx.db, target.id).await.unwrap().unwrap();
    assert_eq!(target.role, UserRole::Farmer);
}

/// A second milk record for the same (cow, date) must conflict, not
/// overwrite.
#[tokio::test]
async fn test_duplicate_milk_record_conflicts() {
    let Some(ctx) = TestContext::new().await else { return };

    let (admin, admin_token) = ctx.user_with_role(UserRole::Admin).await;
    let farm = ctx.farm(admin.id).await;
    let (_, farmer, _) = ctx.farmer_in(farm.id, admin.id).await;

    let (status, cow) = call(
        &ctx.app,
        "POST",
        "/api/cows",
        Some(&admin_token),
        Some(json!({
            "tag_id": format!("TAG-{}", Uuid::new_v4().simple()),
            "farmer_id": farmer.id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{cow}");
    let cow_id = cow["id"].as_str().unwrap().to_string();

    let payload = json!({ "date": "2025-08-01", "liters": "12.50" });
    let uri = format!("/api/cows/{cow_id}/milk");

    let (status, body) = call(&ctx.app, "POST", &uri, Some(&admin_token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = call(&ctx.app, "POST", &uri, Some(&admin_token), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

/// A farmer's new cow lands in their own herd even when the body names a
/// different farmer.
#[tokio::test]
async fn test_farmer_cow_forced_to_own_profile() {
    let Some(ctx) = TestContext::new().await else { return };

    let (admin, _) = ctx.user_with_role(UserRole::Admin).await;
    let farm = ctx.farm(admin.id).await;
    let (_, farmer_a, token_a) = ctx.farmer_in(farm.id, admin.id).await;
    let (_, farmer_b, _) = ctx.farmer_in(farm.id, admin.id).await;

    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/cows",
        Some(&token_a),
        Some(json!({
            "tag_id": format!("TAG-{}", Uuid::new_v4().simple()),
            "farmer_id": farmer_b.id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["farmer"]["id"], json!(farmer_a.id));
}

/// A farmer never sees another farmer's cows: excluded from lists, 404 on
/// direct lookup.
#[tokio::test]
async fn test_farmer_sees_only_own_cows() {
    let Some(ctx) = TestContext::new().await else { return };

    let (admin, admin_token) = ctx.user_with_role(UserRole::Admin).await;
    let farm = ctx.farm(admin.id).await;
    let (_, farmer_a, token_a) = ctx.farmer_in(farm.id, admin.id).await;
    let (_, farmer_b, _) = ctx.farmer_in(farm.id, admin.id).await;

    let mut cow_ids = Vec::new();
    for farmer_id in [farmer_a.id, farmer_b.id] {
        let (status, body) = call(
            &ctx.app,
            "POST",
            "/api/cows",
            Some(&admin_token),
            Some(json!({
                "tag_id": format!("TAG-{}", Uuid::new_v4().simple()),
                "farmer_id": farmer_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        cow_ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, body) = call(&ctx.app, "GET", "/api/cows", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert!(listed.contains(&cow_ids[0].as_str()));
    assert!(!listed.contains(&cow_ids[1].as_str()));

    let (status, _) = call(
        &ctx.app,
        "GET",
        &format!("/api/cows/{}", cow_ids[1]),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Deleting a farm removes its farmers, their cows, and those cows' milk
/// records through foreign-key cascade.
#[tokio::test]
async fn test_farm_delete_cascades() {
    let Some(ctx) = TestContext::new().await else { return };

    let (admin, admin_token) = ctx.user_with_role(UserRole::Admin).await;
    let farm = ctx.farm(admin.id).await;
    let (_, farmer, _) = ctx.farmer_in(farm.id, admin.id).await;

    let (status, cow) = call(
        &ctx.app,
        "POST",
        "/api/cows",
        Some(&admin_token),
        Some(json!({
            "tag_id": format!("TAG-{}", Uuid::new_v4().simple()),
            "farmer_id": farmer.id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let cow_id = cow["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &ctx.app,
        "POST",
        &format!("/api/cows/{cow_id}/milk"),
        Some(&admin_token),
        Some(json!({ "date": "2025-08-02", "liters": "8.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &ctx.app,
        "DELETE",
        &format!("/api/farms/{}", farm.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (farmers,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM farmers WHERE farm_id = $1")
            .bind(farm.id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    let (cows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cows WHERE farmer_id = $1")
        .bind(farmer.id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    let (milk,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM milk_records WHERE cow_id = $1::uuid")
            .bind(cow_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();

    assert_eq!(farmers, 0);
    assert_eq!(cows, 0);
    assert_eq!(milk, 0);
}

/// Registration is gated on the caller's role.
#[tokio::test]
async fn test_registration_role_gate() {
    let Some(ctx) = TestContext::new().await else { return };

    let suffix = Uuid::new_v4().simple().to_string();
    let payload = json!({
        "username": format!("newbie-{suffix}"),
        "email": format!("newbie-{suffix}@example.com"),
        "password": "hunter2!",
    });

    let (_, plain_token) = ctx.user_with_role(UserRole::Unassigned).await;
    let (status, _) = call(
        &ctx.app,
        "POST",
        "/api/auth/register",
        Some(&plain_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin_token) = ctx.user_with_role(UserRole::Admin).await;
    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/auth/register",
        Some(&admin_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Same email again: duplicate rejection
    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/auth/register",
        Some(&admin_token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A user with this email already exists.");
}

/// Login issues a token pair; logout blacklists the refresh token.
#[tokio::test]
async fn test_login_logout_flow() {
    let Some(ctx) = TestContext::new().await else { return };

    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("login-{suffix}@example.com");
    User::create(
        &ctx.db,
        CreateUser {
            email: email.clone(),
            username: format!("login-{suffix}"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: hash_password("correct horse").unwrap(),
        },
    )
    .await
    .unwrap();

    let (status, body) = call(
        &ctx.app,
        "POST",
        "/api/auth/jwt/create",
        None,
        Some(json!({ "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let refresh = body["refresh"].as_str().unwrap().to_string();
    let access = body["access"].as_str().unwrap().to_string();

    // Refresh works before logout
    let (status, _) = call(
        &ctx.app,
        "POST",
        "/api/auth/jwt/refresh",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Logout blacklists the refresh token
    let bearer = format!("Bearer {access}");
    let (status, _) = call(
        &ctx.app,
        "POST",
        "/api/auth/logout",
        Some(&bearer),
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::RESET_CONTENT);

    let (status, _) = call(
        &ctx.app,
        "POST",
        "/api/auth/jwt/refresh",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong password never logs in
    let (status, _) = call(
        &ctx.app,
        "POST",
        "/api/auth/jwt/create",
        None,
        Some(json!({ "email": email, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
