/// Configuration management for the API server
///
/// Loads configuration from environment variables into a typed `Config`
/// struct, one sub-struct per concern. Provider credentials are optional:
/// a missing Stripe key, SMTP host, or chat API key produces the disabled
/// variant of the corresponding service at startup rather than an error.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `JWT_SECRET`: Secret key for token signing, min 32 chars (required)
/// - `JWT_ACCESS_TTL_MINUTES`: Token lifetime (default: 30)
/// - `API_HOST` / `API_PORT`: Bind address (default: 0.0.0.0:8080)
/// - `API_CORS_ORIGINS`: Comma-separated origins, or "*" (default: "*")
/// - `API_PRODUCTION`: Enables HSTS and strict CORS (default: false)
/// - `STRIPE_SECRET_KEY` / `STRIPE_WEBHOOK_SECRET`: Payment bridge
/// - `COURSE_PRICE_CENTS` / `COURSE_CURRENCY`: Pricing (default: 19900 eur)
/// - `CHECKOUT_SUCCESS_URL` / `CHECKOUT_CANCEL_URL`: Redirects
/// - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USERNAME` / `SMTP_PASSWORD` /
///   `SMTP_FROM`: Email notifications
/// - `CHAT_API_KEY` / `CHAT_API_URL` / `CHAT_MODEL`: AI assistant
/// - `RUST_LOG`: Log filter (default: info)

use inspecteur_shared::services::chat::ChatSettings;
use inspecteur_shared::services::email::SmtpSettings;
use inspecteur_shared::services::stripe::StripeSettings;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Stripe configuration
    pub stripe: StripeConfig,

    /// SMTP configuration
    pub smtp: SmtpConfig,

    /// Chat provider configuration
    pub chat: ChatConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; "*" means permissive (development)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Must be kept secret and at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access-token lifetime in minutes
    pub access_ttl_minutes: i64,
}

/// Stripe configuration; `secret_key: None` disables payments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub price_cents: i32,
    pub currency: String,
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// SMTP configuration; `host: None` disables email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
}

/// Chat provider configuration; `api_key: None` disables the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("API_CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("API_PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let access_ttl_minutes = env::var("JWT_ACCESS_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()?;

        let price_cents = env::var("COURSE_PRICE_CENTS")
            .unwrap_or_else(|_| "19900".to_string())
            .parse::<i32>()?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl_minutes,
            },
            stripe: StripeConfig {
                secret_key: env::var("STRIPE_SECRET_KEY").ok(),
                webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").ok(),
                price_cents,
                currency: env::var("COURSE_CURRENCY").unwrap_or_else(|_| "eur".to_string()),
                product_name: env::var("COURSE_PRODUCT_NAME")
                    .unwrap_or_else(|_| "Formation Inspecteur Auto".to_string()),
                success_url: env::var("CHECKOUT_SUCCESS_URL")
                    .unwrap_or_else(|_| "https://inspecteur-auto.fr/merci".to_string()),
                cancel_url: env::var("CHECKOUT_CANCEL_URL")
                    .unwrap_or_else(|_| "https://inspecteur-auto.fr/tarifs".to_string()),
            },
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").ok(),
                port: smtp_port,
                username: env::var("SMTP_USERNAME").ok(),
                password: env::var("SMTP_PASSWORD").ok(),
                from_address: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "Inspecteur Auto <contact@inspecteur-auto.fr>".to_string()),
            },
            chat: ChatConfig {
                api_key: env::var("CHAT_API_KEY").ok(),
                api_url: env::var("CHAT_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
                model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Stripe settings for constructing the payment bridge
    pub fn stripe_settings(&self) -> StripeSettings {
        StripeSettings {
            secret_key: self.stripe.secret_key.clone(),
            webhook_secret: self.stripe.webhook_secret.clone(),
            price_cents: self.stripe.price_cents,
            currency: self.stripe.currency.clone(),
            product_name: self.stripe.product_name.clone(),
            success_url: self.stripe.success_url.clone(),
            cancel_url: self.stripe.cancel_url.clone(),
        }
    }

    /// SMTP settings for constructing the mailer; `None` when SMTP is
    /// not configured
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        self.smtp.host.as_ref().map(|host| SmtpSettings {
            host: host.clone(),
            port: self.smtp.port,
            username: self.smtp.username.clone(),
            password: self.smtp.password.clone(),
            from_address: self.smtp.from_address.clone(),
        })
    }

    /// Chat settings for constructing the assistant
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            api_key: self.chat.api_key.clone(),
            api_url: self.chat.api_url.clone(),
            model: self.chat.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                access_ttl_minutes: 30,
            },
            stripe: StripeConfig {
                secret_key: None,
                webhook_secret: None,
                price_cents: 19900,
                currency: "eur".to_string(),
                product_name: "Formation Inspecteur Auto".to_string(),
                success_url: "https://inspecteur-auto.fr/merci".to_string(),
                cancel_url: "https://inspecteur-auto.fr/tarifs".to_string(),
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

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_absent_providers_yield_disabled_settings() {
        let config = test_config();

        assert!(config.stripe_settings().secret_key.is_none());
        assert!(config.smtp_settings().is_none());
        assert!(config.chat_settings().api_key.is_none());
    }

    #[test]
    fn test_smtp_settings_present_when_host_set() {
        let mut config = test_config();
        config.smtp.host = Some("smtp.example.com".to_string());

        let settings = config.smtp_settings().expect("should be present");
        assert_eq!(settings.host, "smtp.example.com");
        assert_eq!(settings.port, 587);
    }
}
