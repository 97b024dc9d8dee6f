/// AI course-assistant wrapper
///
/// Thin wrapper over an OpenAI-compatible chat-completions endpoint. The
/// assistant answers learner questions about vehicle inspection; it is a
/// convenience feature, so every failure mode (missing API key, provider
/// error, malformed response) degrades to a canned fallback reply rather
/// than surfacing an error to the client. Failures are logged at warn.

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Reply used whenever the provider is unavailable
pub const FALLBACK_REPLY: &str = "Notre assistant est momentanément indisponible. \
     Vous pouvez envoyer votre question à l'équipe via la messagerie, \
     nous vous répondrons rapidement.";

const SYSTEM_PROMPT: &str = "Tu es l'assistant pédagogique de la formation Inspecteur Auto. \
     Tu réponds en français, de façon concise, aux questions des élèves sur \
     l'inspection automobile (contrôle technique, mécanique, carrosserie, \
     essai routier). Si une question sort de ce cadre, invite l'élève à \
     contacter l'équipe via la messagerie.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat provider settings; a missing API key yields the disabled variant
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Provider API key
    pub api_key: Option<String>,

    /// Chat-completions endpoint URL
    pub api_url: String,

    /// Model identifier
    pub model: String,
}

struct ChatInner {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

/// AI assistant handed to handlers through application state
#[derive(Clone)]
pub struct ChatService {
    inner: Option<Arc<ChatInner>>,
}

impl ChatService {
    /// Constructs the disabled variant (always answers with the fallback)
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Constructs the service from settings
    ///
    /// A missing API key yields the disabled variant, never an error.
    pub fn from_settings(settings: &ChatSettings) -> Self {
        let Some(api_key) = settings.api_key.clone() else {
            return Self::disabled();
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            inner: Some(Arc::new(ChatInner {
                client,
                api_key,
                api_url: settings.api_url.clone(),
                model: settings.model.clone(),
            })),
        }
    }

    /// Whether a provider is configured
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Answers a learner's question
    ///
    /// Never fails: provider errors are logged and replaced with
    /// [`FALLBACK_REPLY`].
    pub async fn reply(&self, message: &str) -> String {
        let Some(inner) = &self.inner else {
            debug!("Chat service disabled, returning fallback reply");
            return FALLBACK_REPLY.to_string();
        };

        match Self::request_completion(inner, message).await {
            Ok(reply) => reply,
            Err(reason) => {
                warn!(provider = "chat", %reason, "Chat provider call failed, using fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn request_completion(inner: &ChatInner, message: &str) -> Result<String, String> {
        let body = json!({
            "model": inner.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": message },
            ],
            "max_tokens": 500,
        });

        let response = inner
            .client
            .post(&inner.api_url)
            .bearer_auth(&inner.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("provider returned {}: {}", status, detail));
        }

        let payload: JsonValue = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {}", e))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "response missing message content".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_service_returns_fallback() {
        let service = ChatService::disabled();
        assert!(!service.is_enabled());

        let reply = service.reply("Comment vérifier les freins ?").await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[test]
    fn test_missing_api_key_disables() {
        let settings = ChatSettings {
            api_key: None,
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
        };

        let service = ChatService::from_settings(&settings);
        assert!(!service.is_enabled());
    }

    #[test]
    fn test_api_key_enables() {
        let settings = ChatSettings {
            api_key: Some("sk-test".to_string()),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
        };

        let service = ChatService::from_settings(&settings);
        assert!(service.is_enabled());
    }
}
