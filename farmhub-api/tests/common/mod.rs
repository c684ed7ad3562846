/// Common test utilities for integration tests
///
/// These tests need a real PostgreSQL database. Set `TEST_DATABASE_URL`
/// to run them; without it every test skips itself so the suite still
/// passes on machines without Postgres.

use farmhub_api::app::{build_router, AppState};
use farmhub_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use farmhub_shared::auth::jwt::{create_token, Claims, TokenType};
use farmhub_shared::db::migrations::run_migrations;
use farmhub_shared::models::agent::{Agent, CreateAgent};
use farmhub_shared::models::farm::{CreateFarm, Farm};
use farmhub_shared::models::farmer::{CreateFarmer, Farmer};
use farmhub_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context holding the app, pool, and config
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a context against `TEST_DATABASE_URL`, or None to skip
    pub async fn new() -> Option<Self> {
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

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Some(TestContext { db, app, config })
    }

    /// Creates a user with the given role, returning it and a Bearer value
    pub async fn user_with_role(&self, role: UserRole) -> (User, String) {
        let suffix = Uuid::new_v4().simple().to_string();
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("test-{suffix}@example.com"),
                username: format!("test-{suffix}"),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                password_hash: "x".to_string(),
            },
        )
        .await
        .expect("user creation failed");

        if role != UserRole::Unassigned {
            User::set_role(&self.db, user.id, role)
                .await
                .expect("role update failed");
        }

        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, TEST_JWT_SECRET).expect("token creation failed");

        (user, format!("Bearer {token}"))
    }

    /// Creates a farm owned by `created_by`
    pub async fn farm(&self, created_by: Uuid) -> Farm {
        Farm::create(
            &self.db,
            CreateFarm {
                name: format!("Farm {}", Uuid::new_v4().simple()),
                location: "Testshire".to_string(),
                created_by,
            },
        )
        .await
        .expect("farm creation failed")
    }

    /// Creates a farmer profile (and token) inside `farm`
    pub async fn farmer_in(&self, farm_id: Uuid, created_by: Uuid) -> (User, Farmer, String) {
        let (user, token) = self.user_with_role(UserRole::Unassigned).await;
        let farmer = Farmer::create(
            &self.db,
            CreateFarmer {
                user_id: user.id,
                farm_id,
                created_by,
            },
        )
        .await
        .expect("farmer creation failed");

        (user, farmer, token)
    }

    /// Creates an agent profile for a fresh user
    pub async fn agent(&self) -> (User, Agent, String) {
        let (user, token) = self.user_with_role(UserRole::Unassigned).await;
        let agent = Agent::create(
            &self.db,
            CreateAgent {
                user_id: user.id,
                phone: None,
                locations: String::new(),
            },
        )
        .await
        .expect("agent creation failed");

        (user, agent, token)
    }
}

/// Drives a request through the router and returns (status, body JSON)
pub async fn call(
    app: &axum::Router,
    method: &str,
    uri: &str,
    auth_header: Option<&str>,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use tower::Service as _;

    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(auth) = auth_header {
        builder = builder.header("authorization", auth);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
