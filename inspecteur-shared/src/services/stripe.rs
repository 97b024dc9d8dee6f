/// Stripe payment bridge
///
/// Creates checkout sessions, reconciles their payment status by polling,
/// and verifies webhook signatures. Only the thin slice of the Stripe API
/// this platform uses is modeled: `POST /v1/checkout/sessions`,
/// `GET /v1/checkout/sessions/{id}`, and `checkout.session.completed`
/// events.
///
/// Without a secret key the bridge constructs as a disabled variant whose
/// operations return [`PaymentError::Disabled`]; the API maps that to a
/// service-unavailable response.
///
/// # Webhook signatures
///
/// Stripe signs the raw payload with HMAC-SHA256 and sends a
/// `Stripe-Signature: t=<unix>,v1=<hex>` header. Verification recomputes
/// the MAC over `"{t}.{payload}"`, compares in constant time, and
/// rejects timestamps outside a tolerance window to limit replay.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const API_BASE: &str = "https://api.stripe.com/v1";

/// Maximum accepted age of a signed webhook payload, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for payment operations
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The bridge has no secret key configured
    #[error("Payments are not configured")]
    Disabled,

    /// The Stripe API call failed
    #[error("Payment provider error: {0}")]
    Upstream(String),

    /// Webhook signature verification failed
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// Webhook payload could not be parsed
    #[error("Malformed webhook event: {0}")]
    MalformedEvent(String),
}

/// Stripe settings; a missing secret key yields the disabled variant
#[derive(Debug, Clone)]
pub struct StripeSettings {
    /// Secret API key ("sk_...")
    pub secret_key: Option<String>,

    /// Webhook signing secret ("whsec_...")
    pub webhook_secret: Option<String>,

    /// Course price in cents
    pub price_cents: i32,

    /// ISO currency code, e.g. "eur"
    pub currency: String,

    /// Product name shown on the checkout page
    pub product_name: String,

    /// Redirect after successful payment
    pub success_url: String,

    /// Redirect after cancelled payment
    pub cancel_url: String,
}

/// A newly created checkout session
#[derive(Debug, Clone)]
pub struct CreatedCheckout {
    /// Stripe's session id ("cs_...")
    pub session_id: String,

    /// Hosted checkout page URL to redirect the user to
    pub checkout_url: String,

    /// Amount the session will charge, in cents
    pub amount_cents: i32,
}

/// Payment state of an existing session, as reported by Stripe
#[derive(Debug, Clone, Deserialize)]
pub struct SessionState {
    /// "paid" | "unpaid" | "no_payment_required"
    pub payment_status: String,

    /// Our user id, echoed back from session creation
    pub client_reference_id: Option<String>,
}

impl SessionState {
    /// Whether the session has been paid
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// A verified webhook event, reduced to the fields this platform reads
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Event type, e.g. "checkout.session.completed"
    pub event_type: String,

    /// The checkout session id, when the event carries one
    pub session_id: Option<String>,

    /// Our user id, echoed back from session creation
    pub client_reference_id: Option<String>,

    /// The session's payment status, when present
    pub payment_status: Option<String>,
}

impl WebhookEvent {
    /// Whether this event signals a completed checkout
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == "checkout.session.completed"
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: RawEventObject,
}

#[derive(Debug, Deserialize)]
struct RawEventObject {
    id: Option<String>,
    client_reference_id: Option<String>,
    payment_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    id: String,
    url: Option<String>,
}

struct StripeInner {
    client: reqwest::Client,
    secret_key: String,
    webhook_secret: Option<String>,
    price_cents: i32,
    currency: String,
    product_name: String,
    success_url: String,
    cancel_url: String,
}

/// Payment bridge handed to handlers through application state
#[derive(Clone)]
pub struct StripeService {
    inner: Option<Arc<StripeInner>>,
}

impl StripeService {
    /// Constructs the disabled variant
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Constructs the bridge from settings
    ///
    /// A missing secret key yields the disabled variant, never an error.
    pub fn from_settings(settings: &StripeSettings) -> Self {
        let Some(secret_key) = settings.secret_key.clone() else {
            return Self::disabled();
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            inner: Some(Arc::new(StripeInner {
                client,
                secret_key,
                webhook_secret: settings.webhook_secret.clone(),
                price_cents: settings.price_cents,
                currency: settings.currency.clone(),
                product_name: settings.product_name.clone(),
                success_url: settings.success_url.clone(),
                cancel_url: settings.cancel_url.clone(),
            })),
        }
    }

    /// Whether a secret key is configured
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Creates a hosted checkout session for the course purchase
    ///
    /// `client_reference_id` carries our user id so the webhook and the
    /// polling path can both resolve the paying user.
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<CreatedCheckout, PaymentError> {
        let inner = self.inner.as_ref().ok_or(PaymentError::Disabled)?;

        let amount = inner.price_cents.to_string();
        let user_ref = user_id.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", &inner.success_url),
            ("cancel_url", &inner.cancel_url),
            ("client_reference_id", &user_ref),
            ("customer_email", email),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", &inner.currency),
            ("line_items[0][price_data][unit_amount]", &amount),
            (
                "line_items[0][price_data][product_data][name]",
                &inner.product_name,
            ),
        ];

        let response = inner
            .client
            .post(format!("{}/checkout/sessions", API_BASE))
            .bearer_auth(&inner.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PaymentError::Upstream(format!(
                "session creation returned {}: {}",
                status, detail
            )));
        }

        let session: RawSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Upstream(format!("invalid response body: {}", e)))?;

        let checkout_url = session.url.ok_or_else(|| {
            PaymentError::Upstream("session response missing checkout url".to_string())
        })?;

        Ok(CreatedCheckout {
            session_id: session.id,
            checkout_url,
            amount_cents: inner.price_cents,
        })
    }

    /// Retrieves a session's payment state (polling reconciliation path)
    pub async fn retrieve_session(&self, session_id: &str) -> Result<SessionState, PaymentError> {
        let inner = self.inner.as_ref().ok_or(PaymentError::Disabled)?;

        let response = inner
            .client
            .get(format!("{}/checkout/sessions/{}", API_BASE, session_id))
            .bearer_auth(&inner.secret_key)
            .send()
            .await
            .map_err(|e| PaymentError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PaymentError::Upstream(format!(
                "session retrieval returned {}: {}",
                status, detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Upstream(format!("invalid response body: {}", e)))
    }

    /// Verifies a webhook's signature and parses the event
    ///
    /// `now_ts` is the current Unix timestamp, passed in so the tolerance
    /// check is testable.
    pub fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
        now_ts: i64,
    ) -> Result<WebhookEvent, PaymentError> {
        let inner = self.inner.as_ref().ok_or(PaymentError::Disabled)?;
        let secret = inner
            .webhook_secret
            .as_deref()
            .ok_or(PaymentError::Disabled)?;

        verify_signature(secret, payload, signature_header, now_ts)?;
        parse_event(payload)
    }
}

/// Parses a `Stripe-Signature` header into (timestamp, v1 signatures)
pub fn parse_signature_header(header: &str) -> Result<(i64, Vec<String>), PaymentError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<String> = Vec::new();

    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => {
                timestamp = Some(value.parse().map_err(|_| {
                    PaymentError::InvalidSignature("timestamp is not an integer".to_string())
                })?);
            }
            (Some("v1"), Some(value)) => signatures.push(value.to_string()),
            // Other schemes (v0, ...) are ignored
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentError::InvalidSignature("missing timestamp".to_string()))?;

    if signatures.is_empty() {
        return Err(PaymentError::InvalidSignature(
            "missing v1 signature".to_string(),
        ));
    }

    Ok((timestamp, signatures))
}

/// Verifies an HMAC-SHA256 webhook signature over `"{t}.{payload}"`
///
/// Comparison is constant-time; timestamps older (or newer) than
/// [`SIGNATURE_TOLERANCE_SECS`] are rejected to limit replay.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    signature_header: &str,
    now_ts: i64,
) -> Result<(), PaymentError> {
    let (timestamp, signatures) = parse_signature_header(signature_header)?;

    if (now_ts - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(PaymentError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    for candidate in &signatures {
        let Ok(candidate_bytes) = hex::decode(candidate) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| PaymentError::InvalidSignature(format!("bad secret: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        if mac.verify_slice(&candidate_bytes).is_ok() {
            return Ok(());
        }
    }

    Err(PaymentError::InvalidSignature(
        "no signature matched".to_string(),
    ))
}

/// Parses a webhook payload into the fields this platform reads
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| PaymentError::MalformedEvent(e.to_string()))?;

    Ok(WebhookEvent {
        event_type: raw.event_type,
        session_id: raw.data.object.id,
        client_reference_id: raw.data.object.client_reference_id,
        payment_status: raw.data.object.payment_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn settings(secret_key: Option<&str>) -> StripeSettings {
        StripeSettings {
            secret_key: secret_key.map(str::to_string),
            webhook_secret: Some(SECRET.to_string()),
            price_cents: 19900,
            currency: "eur".to_string(),
            product_name: "Formation Inspecteur Auto".to_string(),
            success_url: "https://inspecteur-auto.fr/merci".to_string(),
            cancel_url: "https://inspecteur-auto.fr/tarifs".to_string(),
        }
    }

    #[test]
    fn test_missing_secret_key_disables() {
        let service = StripeService::from_settings(&settings(None));
        assert!(!service.is_enabled());
    }

    #[test]
    fn test_secret_key_enables() {
        let service = StripeService::from_settings(&settings(Some("sk_test_123")));
        assert!(service.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_operations_error() {
        let service = StripeService::disabled();

        let result = service
            .create_checkout_session(Uuid::new_v4(), "student@example.com")
            .await;
        assert!(matches!(result, Err(PaymentError::Disabled)));

        let result = service.retrieve_session("cs_test").await;
        assert!(matches!(result, Err(PaymentError::Disabled)));
    }

    #[test]
    fn test_parse_signature_header() {
        let (timestamp, signatures) =
            parse_signature_header("t=1700000000,v1=deadbeef,v1=cafebabe").unwrap();
        assert_eq!(timestamp, 1700000000);
        assert_eq!(signatures, vec!["deadbeef", "cafebabe"]);
    }

    #[test]
    fn test_parse_signature_header_missing_parts() {
        assert!(matches!(
            parse_signature_header("v1=deadbeef"),
            Err(PaymentError::InvalidSignature(_))
        ));
        assert!(matches!(
            parse_signature_header("t=1700000000"),
            Err(PaymentError::InvalidSignature(_))
        ));
        assert!(matches!(
            parse_signature_header("t=abc,v1=deadbeef"),
            Err(PaymentError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_verify_signature_roundtrip() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let timestamp = 1700000000;
        let header = format!("t={},v1={}", timestamp, sign(SECRET, timestamp, payload));

        verify_signature(SECRET, payload, &header, timestamp + 10).expect("should verify");
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let payload = b"{}";
        let timestamp = 1700000000;
        let header = format!(
            "t={},v1={}",
            timestamp,
            sign("whsec_other", timestamp, payload)
        );

        let result = verify_signature(SECRET, payload, &header, timestamp);
        assert!(matches!(result, Err(PaymentError::InvalidSignature(_))));
    }

    #[test]
    fn test_verify_signature_tampered_payload() {
        let payload = br#"{"amount":100}"#;
        let timestamp = 1700000000;
        let header = format!("t={},v1={}", timestamp, sign(SECRET, timestamp, payload));

        let result = verify_signature(SECRET, br#"{"amount":999}"#, &header, timestamp);
        assert!(matches!(result, Err(PaymentError::InvalidSignature(_))));
    }

    #[test]
    fn test_verify_signature_outside_tolerance() {
        let payload = b"{}";
        let timestamp = 1700000000;
        let header = format!("t={},v1={}", timestamp, sign(SECRET, timestamp, payload));

        let result = verify_signature(
            SECRET,
            payload,
            &header,
            timestamp + SIGNATURE_TOLERANCE_SECS + 1,
        );
        assert!(matches!(result, Err(PaymentError::InvalidSignature(_))));
    }

    #[test]
    fn test_verify_signature_second_candidate_matches() {
        // Key-rotation case: first v1 is stale, second matches
        let payload = b"{}";
        let timestamp = 1700000000;
        let header = format!(
            "t={},v1={},v1={}",
            timestamp,
            sign("whsec_old", timestamp, payload),
            sign(SECRET, timestamp, payload)
        );

        verify_signature(SECRET, payload, &header, timestamp).expect("should verify");
    }

    #[test]
    fn test_parse_event() {
        let payload = br#"{
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "client_reference_id": "7d9f4d7e-32a5-4c2b-9c2e-1d2f3a4b5c6d",
                    "payment_status": "paid"
                }
            }
        }"#;

        let event = parse_event(payload).unwrap();
        assert!(event.is_checkout_completed());
        assert_eq!(event.session_id.as_deref(), Some("cs_test_123"));
        assert_eq!(event.payment_status.as_deref(), Some("paid"));
    }

    #[test]
    fn test_parse_event_malformed() {
        let result = parse_event(b"not json");
        assert!(matches!(result, Err(PaymentError::MalformedEvent(_))));
    }

    #[test]
    fn test_session_state_is_paid() {
        let paid = SessionState {
            payment_status: "paid".to_string(),
            client_reference_id: None,
        };
        assert!(paid.is_paid());

        let unpaid = SessionState {
            payment_status: "unpaid".to_string(),
            client_reference_id: None,
        };
        assert!(!unpaid.is_paid());
    }
}
