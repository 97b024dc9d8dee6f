/// Email notification service
///
/// Sends the platform's transactional mail (welcome, purchase
/// confirmation, certificate issued) over async SMTP. Without SMTP
/// configuration the service constructs as a disabled no-op: sends
/// succeed silently so the primary operation is never blocked on mail.
///
/// Callers log-and-swallow errors; a failed notification must never fail
/// the request that triggered it, and there is no retry.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::debug;

/// Error type for email operations
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP relay could not be configured
    #[error("SMTP configuration error: {0}")]
    Configuration(String),

    /// An address failed to parse
    #[error("Invalid email address: {0}")]
    Address(String),

    /// The message could not be built
    #[error("Failed to build message: {0}")]
    Build(String),

    /// The SMTP transport failed
    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// SMTP settings; `None` overall means the service runs disabled
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// SMTP relay host
    pub host: String,

    /// Relay port (587 for STARTTLS submission)
    pub port: u16,

    /// Optional credentials
    pub username: Option<String>,
    pub password: Option<String>,

    /// From header, e.g. "Inspecteur Auto <contact@inspecteur-auto.fr>"
    pub from_address: String,
}

struct MailerInner {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Transactional mailer handed to handlers through application state
#[derive(Clone)]
pub struct EmailService {
    inner: Option<Arc<MailerInner>>,
}

impl EmailService {
    /// Constructs the disabled no-op variant
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Constructs the service from settings; `None` yields the disabled
    /// variant
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host or the from address is invalid.
    pub fn from_settings(settings: Option<&SmtpSettings>) -> Result<Self, EmailError> {
        let Some(settings) = settings else {
            return Ok(Self::disabled());
        };

        let from: Mailbox = settings
            .from_address
            .parse()
            .map_err(|e| EmailError::Address(format!("from address: {}", e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| EmailError::Configuration(format!("relay {}: {}", settings.host, e)))?
            .port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            inner: Some(Arc::new(MailerInner {
                transport: builder.build(),
                from,
            })),
        })
    }

    /// Whether a transport is configured
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let Some(inner) = &self.inner else {
            debug!(to, subject, "Email service disabled, skipping send");
            return Ok(());
        };

        let to: Mailbox = to
            .parse()
            .map_err(|e| EmailError::Address(format!("recipient: {}", e)))?;

        let message = Message::builder()
            .from(inner.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        inner
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        Ok(())
    }

    /// Welcome mail after registration
    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let body = format!(
            "Bonjour {name},\n\n\
             Bienvenue sur Inspecteur Auto ! Votre compte est créé.\n\
             Le premier module de la formation est accessible gratuitement.\n\n\
             À bientôt,\nL'équipe Inspecteur Auto"
        );
        self.send(to, "Bienvenue sur Inspecteur Auto", body).await
    }

    /// Purchase confirmation after a paid checkout session
    pub async fn send_purchase_confirmation(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let body = format!(
            "Bonjour {name},\n\n\
             Votre paiement a bien été reçu. L'ensemble des modules de la\n\
             formation Inspecteur Auto est maintenant débloqué.\n\n\
             Bonne formation,\nL'équipe Inspecteur Auto"
        );
        self.send(to, "Votre formation est débloquée", body).await
    }

    /// Certificate notification once the full course is complete
    pub async fn send_certificate_issued(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let body = format!(
            "Bonjour {name},\n\n\
             Félicitations ! Vous avez terminé tous les modules de la\n\
             formation. Votre certificat est disponible dans votre espace\n\
             personnel.\n\n\
             L'équipe Inspecteur Auto"
        );
        self.send(to, "Votre certificat de réussite", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_service_is_a_noop() {
        let service = EmailService::disabled();
        assert!(!service.is_enabled());

        // Disabled sends succeed without a transport
        service
            .send_welcome("student@example.com", "Jean")
            .await
            .expect("disabled send should be Ok");
    }

    #[test]
    fn test_from_settings_none_is_disabled() {
        let service = EmailService::from_settings(None).expect("should construct");
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_from_settings_builds_transport() {
        let settings = SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("mailer".to_string()),
            password: Some("secret".to_string()),
            from_address: "Inspecteur Auto <contact@inspecteur-auto.fr>".to_string(),
        };

        let service = EmailService::from_settings(Some(&settings)).expect("should construct");
        assert!(service.is_enabled());
    }

    #[test]
    fn test_invalid_from_address_rejected() {
        let settings = SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: None,
            password: None,
            from_address: "not-an-address".to_string(),
        };

        let result = EmailService::from_settings(Some(&settings));
        assert!(matches!(result, Err(EmailError::Address(_))));
    }
}
