/// Student messaging endpoints
///
/// # Endpoints
///
/// - `GET  /v1/messages` - The caller's thread (sent + received)
/// - `POST /v1/messages` - Write to the admin inbox
/// - `POST /v1/messages/{id}/read` - Mark a received message read
///
/// Students always write to the admin inbox; admin replies arrive
/// addressed to the student and show up in the same thread.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use inspecteur_shared::auth::middleware::AuthContext;
use inspecteur_shared::models::message::{CreateMessage, Message};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Send request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message body
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub body: String,
}

/// Mark-read response
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub id: Uuid,
    pub read: bool,
}

/// Lists the caller's thread, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages = Message::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(messages))
}

/// Sends a message to the admin inbox
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<Message>> {
    req.validate()?;

    let message = Message::create(
        &state.db,
        CreateMessage {
            sender_id: auth.user_id,
            recipient_id: None,
            body: req.body,
        },
    )
    .await?;

    Ok(Json(message))
}

/// Marks a received message read
///
/// Only the addressee may mark a message; marking an already-read or
/// foreign message answers 404.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MarkReadResponse>> {
    let marked = Message::mark_read(&state.db, id, auth.user_id, auth.is_admin).await?;

    if !marked {
        return Err(ApiError::NotFound(
            "Message not found or already read".to_string(),
        ));
    }

    Ok(Json(MarkReadResponse { id, read: true }))
}
