/// Payment endpoints
///
/// # Endpoints
///
/// - `POST /v1/payments/checkout-session` - Create a hosted checkout
/// - `GET  /v1/payments/status/{session_id}` - Poll and reconcile
/// - `POST /v1/payments/webhook` - Stripe webhook (signature-verified)
///
/// Both the webhook and the polling path flip `has_purchased` with the
/// same idempotent set, so duplicate webhook delivery and poll-after-
/// webhook both leave the flag exactly `true` without erroring. The
/// purchase-confirmation email is best-effort and never fails the
/// payment confirmation.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::Utc;
use inspecteur_shared::auth::middleware::AuthContext;
use inspecteur_shared::models::checkout_session::{CheckoutSession, SessionStatus};
use inspecteur_shared::models::user::User;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Checkout creation response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Stripe session id, used for status polling
    pub session_id: String,

    /// Hosted checkout page to redirect the user to
    pub checkout_url: String,
}

/// Status polling response
#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub session_id: String,

    /// "pending" | "completed" | "expired"
    pub status: String,

    pub has_purchased: bool,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

/// Creates a checkout session for the course purchase
///
/// # Errors
///
/// - `409 Conflict`: Course already purchased
/// - `502 Bad Gateway`: Stripe call failed
/// - `503 Service Unavailable`: Payments not configured
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CheckoutResponse>> {
    if auth.has_purchased {
        return Err(ApiError::Conflict(
            "The course has already been purchased".to_string(),
        ));
    }

    let created = state
        .payments
        .create_checkout_session(auth.user_id, &auth.email)
        .await?;

    CheckoutSession::create(
        &state.db,
        auth.user_id,
        &created.session_id,
        created.amount_cents,
    )
    .await?;

    info!(user_id = %auth.user_id, session_id = %created.session_id, "Checkout session created");

    Ok(Json(CheckoutResponse {
        session_id: created.session_id,
        checkout_url: created.checkout_url,
    }))
}

/// Polls a session's payment status and reconciles on paid
///
/// Only the session's owner (or an admin) may query it. Once the local
/// record is completed the endpoint answers from the database without
/// calling Stripe again.
pub async fn payment_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let session = CheckoutSession::find_by_stripe_id(&state.db, &session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Checkout session not found".to_string()))?;

    if session.user_id != auth.user_id && !auth.is_admin {
        return Err(ApiError::Forbidden(
            "This checkout session belongs to another user".to_string(),
        ));
    }

    // Already reconciled: answer locally
    if session.status == SessionStatus::Completed.as_str() {
        return Ok(Json(PaymentStatusResponse {
            session_id,
            status: session.status,
            has_purchased: true,
        }));
    }

    let remote = state.payments.retrieve_session(&session_id).await?;

    if remote.is_paid() {
        confirm_purchase(&state, session.user_id, &session_id).await?;

        return Ok(Json(PaymentStatusResponse {
            session_id,
            status: SessionStatus::Completed.as_str().to_string(),
            has_purchased: true,
        }));
    }

    Ok(Json(PaymentStatusResponse {
        session_id,
        status: session.status,
        has_purchased: auth.has_purchased,
    }))
}

/// Stripe webhook endpoint (public, signature-verified)
///
/// Duplicate delivery is expected: the purchase flag write is an
/// idempotent set, so replays return 200 and change nothing.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let event = state
        .payments
        .verify_webhook(&body, signature, Utc::now().timestamp())?;

    if !event.is_checkout_completed() {
        // Other event types are acknowledged and ignored
        return Ok(Json(WebhookResponse { received: true }));
    }

    // Resolve the paying user: client_reference_id first, local session
    // record as fallback
    let session_id = event.session_id.clone();
    let user_id = match event
        .client_reference_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok())
    {
        Some(user_id) => Some(user_id),
        None => match &session_id {
            Some(sid) => CheckoutSession::find_by_stripe_id(&state.db, sid)
                .await?
                .map(|s| s.user_id),
            None => None,
        },
    };

    let Some(user_id) = user_id else {
        warn!(?session_id, "Webhook event did not resolve to a user");
        return Ok(Json(WebhookResponse { received: true }));
    };

    if let Some(sid) = &session_id {
        confirm_purchase(&state, user_id, sid).await?;
    } else {
        User::mark_purchased(&state.db, user_id).await?;
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Applies a confirmed payment: idempotent purchase set, session record
/// update, best-effort confirmation email
async fn confirm_purchase(
    state: &AppState,
    user_id: Uuid,
    session_id: &str,
) -> Result<(), ApiError> {
    let already_purchased = User::find_by_id(&state.db, user_id)
        .await?
        .map(|u| u.has_purchased)
        .unwrap_or(false);

    User::mark_purchased(&state.db, user_id).await?;
    CheckoutSession::set_status(&state.db, session_id, SessionStatus::Completed).await?;

    info!(%user_id, %session_id, "Purchase confirmed");

    // Only mail on the first confirmation, and never fail the operation
    if !already_purchased {
        if let Some(user) = User::find_by_id(&state.db, user_id).await? {
            let display_name = user.name.clone().unwrap_or_else(|| user.email.clone());
            if let Err(e) = state
                .email
                .send_purchase_confirmation(&user.email, &display_name)
                .await
            {
                warn!(%user_id, error = %e, "Purchase confirmation email failed");
            }
        }
    }

    Ok(())
}
