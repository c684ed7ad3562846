/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use farmhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = farmhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use farmhub_shared::auth::{jwt, middleware as auth_middleware, middleware::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register           # Role-gated user registration
///     │   ├── POST /logout             # Blacklist a refresh token
///     │   └── /jwt/
///     │       ├── POST /create         # Login, issue token pair
///     │       ├── POST /refresh        # New access token
///     │       └── POST /verify         # Validate a token
///     ├── /farms[/:id]                 # + nested farmers, activities
///     ├── /farmers[/:id]               # + nested cows, activities, milk summary
///     ├── /cows[/:id]                  # + nested milk records and summary
///     ├── /milk/summary                # Record-level summary
///     ├── /activities[/:id]
///     └── /agents[/:id]                # Admin only
/// ```
///
/// The JWT layer covers everything under `/api` except the public token
/// endpoints; handlers read the requester from the injected `AuthContext`.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Token endpoints (public)
    let jwt_routes = Router::new()
        .route("/create", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/verify", post(routes::auth::verify));

    // Registration and logout need an authenticated caller
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/logout", post(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ))
        .nest("/jwt", jwt_routes);

    let farm_routes = Router::new()
        .route("/", get(routes::farms::list_farms).post(routes::farms::create_farm))
        .route(
            "/:farm_id",
            get(routes::farms::get_farm)
                .put(routes::farms::update_farm)
                .patch(routes::farms::update_farm)
                .delete(routes::farms::delete_farm),
        )
        .route(
            "/:farm_id/farmers",
            get(routes::farmers::list_farm_farmers).post(routes::farmers::create_farm_farmer),
        )
        .route(
            "/:farm_id/activities",
            get(routes::activities::list_farm_activities),
        );

    let farmer_routes = Router::new()
        .route(
            "/",
            get(routes::farmers::list_farmers).post(routes::farmers::create_farmer),
        )
        .route(
            "/:farmer_id",
            get(routes::farmers::get_farmer)
                .put(routes::farmers::update_farmer)
                .patch(routes::farmers::update_farmer)
                .delete(routes::farmers::delete_farmer),
        )
        .route(
            "/:farmer_id/cows",
            get(routes::cows::list_farmer_cows).post(routes::cows::create_farmer_cow),
        )
        .route(
            "/:farmer_id/activities",
            get(routes::activities::list_farmer_activities)
                .post(routes::activities::create_farmer_activity),
        )
        .route(
            "/:farmer_id/milk/summary",
            get(routes::milk_records::farmer_milk_summary),
        );

    let cow_routes = Router::new()
        .route("/", get(routes::cows::list_cows).post(routes::cows::create_cow))
        .route(
            "/:cow_id",
            get(routes::cows::get_cow)
                .put(routes::cows::update_cow)
                .patch(routes::cows::update_cow)
                .delete(routes::cows::delete_cow),
        )
        .route(
            "/:cow_id/milk",
            get(routes::milk_records::list_cow_milk).post(routes::milk_records::create_cow_milk),
        )
        .route(
            "/:cow_id/milk/summary",
            get(routes::milk_records::cow_milk_summary),
        )
        .route(
            "/:cow_id/milk/:record_id",
            get(routes::milk_records::get_milk_record)
                .put(routes::milk_records::update_milk_record)
                .patch(routes::milk_records::update_milk_record)
                .delete(routes::milk_records::delete_milk_record),
        );

    let activity_routes = Router::new()
        .route(
            "/",
            get(routes::activities::list_activities).post(routes::activities::create_activity),
        )
        .route(
            "/:activity_id",
            get(routes::activities::get_activity)
                .put(routes::activities::update_activity)
                .patch(routes::activities::update_activity)
                .delete(routes::activities::delete_activity),
        );

    let agent_routes = Router::new()
        .route(
            "/",
            get(routes::agents::list_agents).post(routes::agents::create_agent),
        )
        .route(
            "/:agent_id",
            get(routes::agents::get_agent)
                .put(routes::agents::update_agent)
                .patch(routes::agents::update_agent)
                .delete(routes::agents::delete_agent),
        );

    // Resource routes all sit behind the JWT layer
    let resource_routes = Router::new()
        .nest("/farms", farm_routes)
        .nest("/farmers", farmer_routes)
        .nest("/cows", cow_routes)
        .nest("/activities", activity_routes)
        .nest("/agents", agent_routes)
        .route("/milk/summary", get(routes::milk_records::milk_summary))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(resource_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the access token from the Authorization header,
/// loads the requester's current role and farmer profile, and injects the
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = auth_middleware::extract_bearer_token(req.headers())?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // Role and profile are read fresh so demotions apply immediately
    let auth_context = AuthContext::load(&state.db, claims.sub).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
