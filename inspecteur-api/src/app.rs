/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use inspecteur_api::{app::AppState, config::Config};
/// use inspecteur_shared::services::{
///     chat::ChatService, email::EmailService, stripe::StripeService,
/// };
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(
///     pool,
///     config.clone(),
///     EmailService::from_settings(config.smtp_settings().as_ref())?,
///     ChatService::from_settings(&config.chat_settings()),
///     StripeService::from_settings(&config.stripe_settings()),
/// );
/// let app = inspecteur_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use inspecteur_shared::auth::middleware as auth_middleware;
use inspecteur_shared::services::{chat::ChatService, email::EmailService, stripe::StripeService};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the
/// provider services are explicitly constructed objects (no global
/// singletons) and are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Transactional mailer (possibly disabled)
    pub email: EmailService,

    /// AI course assistant (possibly disabled)
    pub chat: ChatService,

    /// Stripe payment bridge (possibly disabled)
    pub payments: StripeService,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: PgPool,
        config: Config,
        email: EmailService,
        chat: ChatService,
        payments: StripeService,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            email,
            chat,
            payments,
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the access-token lifetime in minutes
    pub fn jwt_ttl_minutes(&self) -> i64 {
        self.config.jwt.access_ttl_minutes
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /v1/
///     ├── /auth/register, /auth/login      # Public
///     ├── /payments/webhook                # Public (signature-verified)
///     ├── /me, /modules, /quizzes, /progress,
///     │   /payments, /chat, /messages      # Bearer auth
///     └── /admin/*                         # Bearer auth + admin guard
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route-group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Learner routes (bearer auth)
    let learner_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/modules", get(routes::modules::list_modules))
        .route("/modules/:id", get(routes::modules::get_module))
        .route(
            "/quizzes/module/:module_id",
            get(routes::quizzes::get_module_quiz),
        )
        .route("/quizzes/:id/submit", post(routes::quizzes::submit_quiz))
        .route("/progress", get(routes::progress::get_progress))
        .route(
            "/progress/check-access/:module_id",
            get(routes::progress::check_access),
        )
        .route(
            "/progress/complete/:module_id",
            post(routes::progress::complete_module),
        )
        .route(
            "/payments/checkout-session",
            post(routes::payments::create_checkout_session),
        )
        .route(
            "/payments/status/:session_id",
            get(routes::payments::payment_status),
        )
        .route("/chat", post(routes::chat::chat))
        .route("/messages", get(routes::messages::list_messages))
        .route("/messages", post(routes::messages::send_message))
        .route("/messages/:id/read", post(routes::messages::mark_read))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Admin routes (bearer auth + admin guard)
    let admin_routes = Router::new()
        .route("/modules", get(routes::admin::modules::list_modules))
        .route("/modules", post(routes::admin::modules::create_module))
        .route("/modules/:id", get(routes::admin::modules::get_module))
        .route("/modules/:id", put(routes::admin::modules::update_module))
        .route(
            "/modules/:id",
            axum::routing::delete(routes::admin::modules::delete_module),
        )
        .route("/quizzes", get(routes::admin::quizzes::list_quizzes))
        .route("/quizzes", post(routes::admin::quizzes::create_quiz))
        .route("/quizzes/:id", get(routes::admin::quizzes::get_quiz))
        .route("/quizzes/:id", put(routes::admin::quizzes::update_quiz))
        .route(
            "/quizzes/:id",
            axum::routing::delete(routes::admin::quizzes::delete_quiz),
        )
        .route(
            "/quizzes/:id/attempts",
            get(routes::admin::quizzes::list_attempts),
        )
        .route("/users", get(routes::admin::users::list_users))
        .route("/messages", get(routes::admin::messages::list_inbox))
        .route("/messages", post(routes::admin::messages::reply))
        .layer(axum::middleware::from_fn(admin_guard_layer))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/payments/webhook", post(routes::payments::webhook))
        .merge(learner_routes)
        .nest("/admin", admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
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
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Delegates to the shared middleware, which validates the token and
/// resolves its subject email to a user row, then injects `AuthContext`
/// into request extensions.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    auth_middleware::bearer_auth_middleware(
        state.db.clone(),
        state.config.jwt.secret.clone(),
        req,
        next,
    )
    .await
    .map_err(ApiError::from)
}

/// Admin guard middleware layer
///
/// Runs after the bearer layer and rejects non-admin users.
async fn admin_guard_layer(req: Request, next: Next) -> Result<Response, ApiError> {
    auth_middleware::require_admin_middleware(req, next)
        .await
        .map_err(ApiError::from)
}
