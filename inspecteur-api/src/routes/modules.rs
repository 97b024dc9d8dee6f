/// Course catalog endpoints
///
/// # Endpoints
///
/// - `GET /v1/modules` - Ordered catalog with per-module accessibility
/// - `GET /v1/modules/{id}` - Full module content, gated
///
/// The listing never includes content bodies; the detail endpoint runs
/// the progression gate and answers 403 with the block reason when the
/// module is locked.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use inspecteur_shared::auth::middleware::AuthContext;
use inspecteur_shared::models::{module::Module, module_progress::ModuleProgress};
use inspecteur_shared::progression;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Catalog entry (no content body)
#[derive(Debug, Serialize)]
pub struct ModuleSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub is_free: bool,

    /// Whether the progression gate currently allows this user in
    pub accessible: bool,

    /// Gate reason when not accessible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<&'static str>,

    /// Whether this user has completed the module
    pub completed: bool,
}

/// Full module content
#[derive(Debug, Serialize)]
pub struct ModuleDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    pub order_index: i32,
    pub is_free: bool,
}

impl From<Module> for ModuleDetail {
    fn from(module: Module) -> Self {
        Self {
            id: module.id,
            title: module.title,
            description: module.description,
            content: module.content,
            video_url: module.video_url,
            order_index: module.order_index,
            is_free: module.is_free,
        }
    }
}

/// Lists the catalog in sequence order with accessibility flags
pub async fn list_modules(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ModuleSummary>>> {
    let modules = Module::list_ordered(&state.db).await?;

    let completed: HashMap<Uuid, bool> = ModuleProgress::list_for_user(&state.db, auth.user_id)
        .await?
        .into_iter()
        .map(|p| (p.module_id, p.completed))
        .collect();

    let mut summaries = Vec::with_capacity(modules.len());
    for module in modules {
        let decision =
            progression::check_access(&state.db, auth.user_id, auth.has_purchased, &module)
                .await?;

        summaries.push(ModuleSummary {
            accessible: decision.is_allowed(),
            blocked_reason: decision.reason().map(|r| r.as_str()),
            completed: completed.get(&module.id).copied().unwrap_or(false),
            id: module.id,
            title: module.title,
            description: module.description,
            order_index: module.order_index,
            is_free: module.is_free,
        });
    }

    Ok(Json(summaries))
}

/// Returns a module's full content, or 403 with the gate's block reason
pub async fn get_module(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ModuleDetail>> {
    let module = Module::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    let decision =
        progression::check_access(&state.db, auth.user_id, auth.has_purchased, &module).await?;

    if let Some(reason) = decision.reason() {
        return Err(ApiError::AccessBlocked(reason));
    }

    Ok(Json(ModuleDetail::from(module)))
}
