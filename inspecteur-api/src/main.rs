//! # Inspecteur Auto API Server
//!
//! The API server behind the Inspecteur Auto course platform: gated
//! module content, quizzes, progress and certificates, Stripe checkout,
//! messaging, and the admin panel.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p inspecteur-api
//! ```

use inspecteur_api::app::{build_router, AppState};
use inspecteur_api::config::Config;
use inspecteur_shared::db::migrations::run_migrations;
use inspecteur_shared::db::pool::{create_pool, DatabaseConfig};
use inspecteur_shared::services::chat::ChatService;
use inspecteur_shared::services::email::EmailService;
use inspecteur_shared::services::stripe::StripeService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inspecteur_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Inspecteur Auto API v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and run migrations
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    // Construct provider services; absent credentials yield disabled
    // variants rather than startup failures
    let email = EmailService::from_settings(config.smtp_settings().as_ref())?;
    let chat = ChatService::from_settings(&config.chat_settings());
    let payments = StripeService::from_settings(&config.stripe_settings());

    if !email.is_enabled() {
        tracing::warn!("SMTP not configured, email notifications disabled");
    }
    if !chat.is_enabled() {
        tracing::warn!("Chat provider not configured, assistant will use fallback replies");
    }
    if !payments.is_enabled() {
        tracing::warn!("Stripe not configured, payment endpoints disabled");
    }

    // Build Axum application
    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, email, chat, payments);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
