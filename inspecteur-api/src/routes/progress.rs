/// Progress endpoints
///
/// # Endpoints
///
/// - `GET  /v1/progress` - Progress summary (modules, attempts, certificate)
/// - `GET  /v1/progress/check-access/{module_id}` - Gate decision as data
/// - `POST /v1/progress/complete/{module_id}` - Mark a module completed
///
/// Completing the last module triggers certificate issuance. The
/// certificate write is a conditional single-statement update, so even
/// repeated or concurrent completion calls issue at most one certificate
/// per user.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use inspecteur_shared::auth::middleware::AuthContext;
use inspecteur_shared::models::{
    module::Module, module_progress::ModuleProgress, quiz_attempt::QuizAttempt, user::User,
};
use inspecteur_shared::services::certificate;
use inspecteur_shared::progression;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Gate decision as data (the check-access endpoint never 403s)
#[derive(Debug, Serialize)]
pub struct CheckAccessResponse {
    pub can_access: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// One module's progress line in the summary
#[derive(Debug, Serialize)]
pub struct ModuleProgressView {
    pub module_id: Uuid,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Progress summary
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub total_modules: i64,
    pub completed_modules: i64,
    pub quiz_attempts: i64,
    pub certificate_url: Option<String>,
    pub modules: Vec<ModuleProgressView>,
}

/// Completion response
#[derive(Debug, Serialize)]
pub struct CompleteModuleResponse {
    pub module_id: Uuid,
    pub completed: bool,

    /// Whether every module in the catalog is now complete
    pub course_completed: bool,

    /// Whether this call issued the certificate
    pub certificate_issued: bool,

    pub certificate_url: Option<String>,
}

/// Progress summary for the current user
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProgressResponse>> {
    let total_modules = Module::count(&state.db).await?;
    let completed_modules = ModuleProgress::count_completed(&state.db, auth.user_id).await?;
    let quiz_attempts = QuizAttempt::count_by_user(&state.db, auth.user_id).await?;

    let certificate_url = User::find_by_id(&state.db, auth.user_id)
        .await?
        .and_then(|u| u.certificate_url);

    let modules = ModuleProgress::list_for_user(&state.db, auth.user_id)
        .await?
        .into_iter()
        .map(|p| ModuleProgressView {
            module_id: p.module_id,
            completed: p.completed,
            completed_at: p.completed_at,
        })
        .collect();

    Ok(Json(ProgressResponse {
        total_modules,
        completed_modules,
        quiz_attempts,
        certificate_url,
        modules,
    }))
}

/// Gate decision for a module, returned as data rather than a 403
pub async fn check_access(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(module_id): Path<Uuid>,
) -> ApiResult<Json<CheckAccessResponse>> {
    let module = Module::find_by_id(&state.db, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    let decision =
        progression::check_access(&state.db, auth.user_id, auth.has_purchased, &module).await?;

    Ok(Json(CheckAccessResponse {
        can_access: decision.is_allowed(),
        reason: decision.reason().map(|r| r.as_str()),
    }))
}

/// Marks a module completed (idempotent) and issues the certificate when
/// the whole catalog is done
pub async fn complete_module(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(module_id): Path<Uuid>,
) -> ApiResult<Json<CompleteModuleResponse>> {
    let module = Module::find_by_id(&state.db, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    // A module can only be completed if it can be accessed
    let decision =
        progression::check_access(&state.db, auth.user_id, auth.has_purchased, &module).await?;
    if let Some(reason) = decision.reason() {
        return Err(ApiError::AccessBlocked(reason));
    }

    ModuleProgress::upsert_completed(&state.db, auth.user_id, module.id).await?;

    let total_modules = Module::count(&state.db).await?;
    let completed_modules = ModuleProgress::count_completed(&state.db, auth.user_id).await?;
    let course_completed = total_modules > 0 && completed_modules >= total_modules;

    let mut certificate_issued = false;
    if course_completed {
        let uri = certificate::data_uri(auth.display_name(), Utc::now());

        // Conditional update: only the first writer wins, repeats are no-ops
        certificate_issued =
            User::set_certificate_if_absent(&state.db, auth.user_id, &uri).await?;

        if certificate_issued {
            info!(user_id = %auth.user_id, "Certificate issued");
            if let Err(e) = state
                .email
                .send_certificate_issued(&auth.email, auth.display_name())
                .await
            {
                warn!(user_id = %auth.user_id, error = %e, "Certificate email failed");
            }
        }
    }

    let certificate_url = User::find_by_id(&state.db, auth.user_id)
        .await?
        .and_then(|u| u.certificate_url);

    Ok(Json(CompleteModuleResponse {
        module_id: module.id,
        completed: true,
        course_completed,
        certificate_issued,
        certificate_url,
    }))
}
