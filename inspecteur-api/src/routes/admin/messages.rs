/// Admin messaging
///
/// # Endpoints
///
/// - `GET  /v1/admin/messages` - Inbox (messages addressed to staff)
/// - `POST /v1/admin/messages` - Reply to a student

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use inspecteur_shared::auth::middleware::AuthContext;
use inspecteur_shared::models::message::{CreateMessage, Message};
use inspecteur_shared::models::user::User;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::Pagination;

/// Reply request
#[derive(Debug, Deserialize, Validate)]
pub struct ReplyRequest {
    /// The student to reply to
    pub recipient_id: Uuid,

    /// Message body
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub body: String,
}

/// Lists the admin inbox, newest first
pub async fn list_inbox(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages =
        Message::list_admin_inbox(&state.db, pagination.clamped_limit(), pagination.offset)
            .await?;
    Ok(Json(messages))
}

/// Replies to a student
pub async fn reply(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ReplyRequest>,
) -> ApiResult<Json<Message>> {
    req.validate()?;

    // The recipient must exist
    User::find_by_id(&state.db, req.recipient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipient not found".to_string()))?;

    let message = Message::create(
        &state.db,
        CreateMessage {
            sender_id: auth.user_id,
            recipient_id: Some(req.recipient_id),
            body: req.body,
        },
    )
    .await?;

    Ok(Json(message))
}
