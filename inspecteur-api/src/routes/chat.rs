/// AI course-assistant endpoint
///
/// # Endpoint
///
/// - `POST /v1/chat` - Ask the assistant a question
///
/// The assistant degrades to a canned fallback reply when the provider
/// is unavailable; this endpoint never surfaces a provider error.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use inspecteur_shared::auth::middleware::AuthContext;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Chat request
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    /// The learner's question
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Asks the course assistant a question
pub async fn chat(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    req.validate()?;

    let reply = state.chat.reply(&req.message).await;

    Ok(Json(ChatResponse { reply }))
}
