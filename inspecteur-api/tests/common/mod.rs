/// Common test utilities for integration tests
///
/// These tests require a running PostgreSQL database, located via the
/// `DATABASE_URL` environment variable. When it is not set the tests
/// skip themselves rather than fail, so the unit suite stays green on
/// machines without a database.
///
/// Provided here:
/// - Test application setup (state + router, providers disabled)
/// - Test user creation and bearer tokens
/// - JSON request helpers
/// - Webhook payload signing

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use inspecteur_api::app::{build_router, AppState};
use inspecteur_api::config::{
    ApiConfig, ChatConfig, Config, DatabaseConfig, JwtConfig, SmtpConfig, StripeConfig,
};
use inspecteur_shared::auth::jwt;
use inspecteur_shared::auth::password;
use inspecteur_shared::db::migrations::run_migrations;
use inspecteur_shared::models::module::{CreateModule, Module};
use inspecteur_shared::models::quiz::{CreateQuestion, CreateQuiz, Quiz};
use inspecteur_shared::models::user::{CreateUser, User};
use inspecteur_shared::services::chat::ChatService;
use inspecteur_shared::services::email::EmailService;
use inspecteur_shared::services::stripe::StripeService;
use sha2::Sha256;
use sqlx::PgPool;
use tower::ServiceExt as _;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_integration_test_secret";

/// Test context containing the app and its backing resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub token: String,

    module_ids: Vec<Uuid>,
}

impl TestContext {
    /// Creates a new test context, or `None` when no database is
    /// configured
    pub async fn try_new() -> anyhow::Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };

        let config = test_config(&database_url);

        let db = PgPool::connect(&database_url).await?;
        run_migrations(&db).await?;

        // Create a test learner
        let email = format!("test-{}@example.com", Uuid::new_v4());
        let user = User::create(
            &db,
            CreateUser {
                email: email.clone(),
                password_hash: password::hash_password("voiture2024")?,
                name: Some("Test Learner".to_string()),
            },
        )
        .await?;

        let claims = jwt::Claims::new(&user.email, config.jwt.access_ttl_minutes);
        let token = jwt::create_token(&claims, &config.jwt.secret)?;

        // Providers: mail and chat disabled, payments enabled so the
        // webhook signature path can be exercised
        let state = AppState::new(
            db.clone(),
            config.clone(),
            EmailService::disabled(),
            ChatService::disabled(),
            StripeService::from_settings(&config.stripe_settings()),
        );
        let app = build_router(state);

        Ok(Some(TestContext {
            db,
            app,
            config,
            user,
            token,
            module_ids: Vec::new(),
        }))
    }

    /// Returns the authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Issues a token for an arbitrary email (e.g. an admin account)
    pub fn token_for(&self, email: &str) -> String {
        let claims = jwt::Claims::new(email, self.config.jwt.access_ttl_minutes);
        jwt::create_token(&claims, &self.config.jwt.secret).expect("token creation")
    }

    /// Creates an admin account and returns (user, bearer token)
    pub async fn create_admin(&self) -> anyhow::Result<(User, String)> {
        let email = format!("admin-{}@example.com", Uuid::new_v4());
        let user = User::create(
            &self.db,
            CreateUser {
                email: email.clone(),
                password_hash: password::hash_password("controle2024")?,
                name: Some("Test Admin".to_string()),
            },
        )
        .await?;

        sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        Ok((user, self.token_for(&email)))
    }

    /// Creates a module at the given offset above this context's order
    /// base, tracking it for cleanup
    pub async fn create_module(
        &mut self,
        offset: i32,
        is_free: bool,
    ) -> anyhow::Result<Module> {
        let base = self.order_base();
        let module = Module::create(
            &self.db,
            CreateModule {
                title: format!("Module {}", offset + 1),
                description: "Test module".to_string(),
                content: "Contenu du module".to_string(),
                video_url: None,
                order_index: base + offset,
                is_free,
            },
        )
        .await?;

        self.module_ids.push(module.id);
        Ok(module)
    }

    /// A per-context order_index base so concurrent tests don't collide
    fn order_base(&self) -> i32 {
        (self.user.id.as_u128() % 1_000_000) as i32 * 100
    }

    /// Attaches a quiz to a module: `question_count` questions, correct
    /// answer is always option 0
    pub async fn create_quiz(
        &self,
        module_id: Uuid,
        question_count: usize,
        passing_score: i32,
    ) -> anyhow::Result<Quiz> {
        let questions = (0..question_count)
            .map(|i| CreateQuestion {
                prompt: format!("Question {}", i + 1),
                options: vec!["Bonne".to_string(), "Mauvaise".to_string()],
                correct_index: 0,
            })
            .collect();

        let quiz = Quiz::create(
            &self.db,
            CreateQuiz {
                module_id,
                title: "Quiz du module".to_string(),
                passing_score,
                questions,
            },
        )
        .await?;

        Ok(quiz)
    }

    /// Sends a JSON request and returns (status, parsed body)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request build"),
            None => builder.body(Body::empty()).expect("request build"),
        };

        let response = self.app.clone().oneshot(request).await.expect("request");
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Posts a signed webhook payload
    pub async fn post_webhook(&self, payload: &str) -> (StatusCode, serde_json::Value) {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_webhook(TEST_WEBHOOK_SECRET, timestamp, payload.as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/v1/payments/webhook")
            .header("content-type", "application/json")
            .header(
                "Stripe-Signature",
                format!("t={},v1={}", timestamp, signature),
            )
            .body(Body::from(payload.to_string()))
            .expect("request build");

        let response = self.app.clone().oneshot(request).await.expect("request");
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        (status, json)
    }

    /// Removes the rows this context created
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for module_id in &self.module_ids {
            Module::delete(&self.db, *module_id).await?;
        }

        // Cascades to attempts, progress, sessions, and messages
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Computes a Stripe-style webhook signature over `"{t}.{payload}"`
pub fn sign_webhook(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_ttl_minutes: 30,
        },
        stripe: StripeConfig {
            secret_key: Some("sk_test_dummy".to_string()),
            webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
            price_cents: 19900,
            currency: "eur".to_string(),
            product_name: "Formation Inspecteur Auto".to_string(),
            success_url: "http://localhost/merci".to_string(),
            cancel_url: "http://localhost/tarifs".to_string(),
        },
        smtp: SmtpConfig {
            host: None,
            port: 587,
            username: None,
            password: None,
            from_address: "Inspecteur Auto <contact@inspecteur-auto.fr>".to_string(),
        },
        chat: ChatConfig {
            api_key: None,
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
        },
    }
}
