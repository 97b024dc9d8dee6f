/// Admin module CRUD
///
/// # Endpoints
///
/// - `GET    /v1/admin/modules` - Full catalog (content included)
/// - `POST   /v1/admin/modules` - Create a module
/// - `GET    /v1/admin/modules/{id}` - One module
/// - `PUT    /v1/admin/modules/{id}` - Replace a module
/// - `DELETE /v1/admin/modules/{id}` - Delete a module
///
/// A duplicate `order_index` answers 409 via the unique constraint.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use inspecteur_shared::models::module::{CreateModule, Module, UpdateModule};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create/replace request body
#[derive(Debug, Deserialize, Validate)]
pub struct ModuleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub content: String,

    #[validate(url(message = "video_url must be a valid URL"))]
    pub video_url: Option<String>,

    #[validate(range(min = 0, message = "order_index must be non-negative"))]
    pub order_index: i32,

    #[serde(default)]
    pub is_free: bool,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Lists all modules with their content bodies
pub async fn list_modules(State(state): State<AppState>) -> ApiResult<Json<Vec<Module>>> {
    let modules = Module::list_ordered(&state.db).await?;
    Ok(Json(modules))
}

/// Creates a module
pub async fn create_module(
    State(state): State<AppState>,
    Json(req): Json<ModuleRequest>,
) -> ApiResult<Json<Module>> {
    req.validate()?;

    let module = Module::create(
        &state.db,
        CreateModule {
            title: req.title,
            description: req.description,
            content: req.content,
            video_url: req.video_url,
            order_index: req.order_index,
            is_free: req.is_free,
        },
    )
    .await?;

    Ok(Json(module))
}

/// Returns one module
pub async fn get_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Module>> {
    let module = Module::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    Ok(Json(module))
}

/// Replaces a module
pub async fn update_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ModuleRequest>,
) -> ApiResult<Json<Module>> {
    req.validate()?;

    let module = Module::update(
        &state.db,
        id,
        UpdateModule {
            title: req.title,
            description: req.description,
            content: req.content,
            video_url: req.video_url,
            order_index: req.order_index,
            is_free: req.is_free,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    Ok(Json(module))
}

/// Deletes a module (cascades to quiz, attempts, progress)
pub async fn delete_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = Module::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Module not found".to_string()));
    }

    Ok(Json(DeleteResponse { id, deleted }))
}
