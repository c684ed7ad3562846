/// Integration tests for the reporting service
///
/// Set `TEST_DATABASE_URL` to run against a real Postgres; without it the
/// tests skip themselves.

use axum::http::StatusCode;
use farmhub_reporting::app::{build_router, AppState};
use farmhub_shared::db::migrations::run_migrations;
use farmhub_shared::models::cow::{Cow, CreateCow};
use farmhub_shared::models::farm::{CreateFarm, Farm};
use farmhub_shared::models::farmer::{CreateFarmer, Farmer};
use farmhub_shared::models::milk_record::{CreateMilkRecord, MilkRecord};
use farmhub_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

struct TestContext {
    db: PgPool,
    app: axum::Router,
}

async fn setup() -> Option<TestContext> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping integration test");
            return None;
        }
    };

    let db = PgPool::connect(&url)
        .await
        .expect("failed to connect to test database");
    run_migrations(&db).await.expect("migrations failed");

    let app = build_router(AppState::new(db.clone()));
    Some(TestContext { db, app })
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Seeds a farm with one farmer, one cow, and two milk records
async fn seed(db: &PgPool) -> (Farm, Farmer, Cow) {
    let suffix = Uuid::new_v4().simple().to_string();

    let admin = User::create(
        db,
        CreateUser {
            email: format!("admin-{suffix}@example.com"),
            username: format!("admin-{suffix}"),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
            password_hash: "x".to_string(),
        },
    )
    .await
    .unwrap();
    User::set_role(db, admin.id, UserRole::Admin).await.unwrap();

    let farm = Farm::create(
        db,
        CreateFarm {
            name: format!("Report Farm {suffix}"),
            location: "Hills".to_string(),
            created_by: admin.id,
        },
    )
    .await
    .unwrap();

    let farmer_user = User::create(
        db,
        CreateUser {
            email: format!("farmer-{suffix}@example.com"),
            username: format!("farmer-{suffix}"),
            first_name: "Fred".to_string(),
            last_name: "Fields".to_string(),
            password_hash: "x".to_string(),
        },
    )
    .await
    .unwrap();
    let farmer = Farmer::create(
        db,
        CreateFarmer {
            user_id: farmer_user.id,
            farm_id: farm.id,
            created_by: admin.id,
        },
    )
    .await
    .unwrap();

    let cow = Cow::create(
        db,
        CreateCow {
            tag_id: format!("RPT-{suffix}"),
            farmer_id: farmer.id,
            birth_date: None,
            created_by: admin.id,
        },
    )
    .await
    .unwrap();

    for (date, liters) in [("2025-07-01", "10.00"), ("2025-07-02", "12.00")] {
        MilkRecord::create(
            db,
            CreateMilkRecord {
                cow_id: cow.id,
                date: date.parse().unwrap(),
                liters: liters.parse().unwrap(),
                recorded_by: admin.id,
                created_by: admin.id,
            },
        )
        .await
        .unwrap();
    }

    (farm, farmer, cow)
}

#[tokio::test]
async fn test_health() {
    let Some(ctx) = setup().await else { return };

    let (status, body) = get(&ctx.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_farm_summary_counts() {
    let Some(ctx) = setup().await else { return };
    let (farm, _, _) = seed(&ctx.db).await;

    let (status, body) = get(&ctx.app, &format!("/farms/{}/summary", farm.id)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["farmers_count"], 1);
    assert_eq!(body["cows_count"], 1);
    assert_eq!(body["total_milk"], 22.0);

    // Unknown farm is a 404, not a zero row
    let (status, _) = get(&ctx.app, &format!("/farms/{}/summary", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_farmer_summary_denormalizes_names() {
    let Some(ctx) = setup().await else { return };
    let (farm, farmer, _) = seed(&ctx.db).await;

    let (status, body) = get(&ctx.app, &format!("/farmers/{}/summary", farmer.id)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["farm_name"], serde_json::json!(farm.name));
    assert!(body["user_email"].as_str().unwrap().contains("@example.com"));
    assert_eq!(body["cows_count"], 1);
}

#[tokio::test]
async fn test_milk_by_date_accepts_both_formats() {
    let Some(ctx) = setup().await else { return };
    let (farm, _, _) = seed(&ctx.db).await;

    // Mixed formats parse; scoped to the seeded farm
    let (status, body) = get(
        &ctx.app,
        &format!(
            "/milk/by-date?start_date=07/01/2025&end_date=2025-07-31&farm_id={}",
            farm.id
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date"], "2025-07-01");
    assert_eq!(rows[0]["total_liters"], 10.0);
    assert_eq!(rows[0]["cow_count"], 1);
}

#[tokio::test]
async fn test_milk_by_date_empty_range_is_empty_list() {
    let Some(ctx) = setup().await else { return };

    let (status, body) = get(
        &ctx.app,
        "/milk/by-date?start_date=1990-01-01&end_date=1990-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_milk_by_date_validates_input() {
    let Some(ctx) = setup().await else { return };

    // Missing bounds
    let (status, body) = get(&ctx.app, "/milk/by-date?start_date=2025-08-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Both start_date and end_date are required");

    // Unparseable date
    let (status, body) = get(
        &ctx.app,
        "/milk/by-date?start_date=01.08.2025&end_date=2025-08-31",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "Invalid date format. Use YYYY-MM-DD or MM/DD/YYYY"
    );
}

#[tokio::test]
async fn test_milk_summary_filters_totals() {
    let Some(ctx) = setup().await else { return };
    let (_, farmer, _) = seed(&ctx.db).await;

    let (status, body) = get(&ctx.app, &format!("/milk/summary?farmer_id={}", farmer.id)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total_cows"], 1);
    assert_eq!(body["total_milk"], 22.0);
    assert_eq!(body["average_per_cow"], 22.0);
}
