/// Admin user listing
///
/// # Endpoints
///
/// - `GET /v1/admin/users` - Paginated listing with purchase and
///   certificate state (never the password hash)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use inspecteur_shared::models::user::User;
use serde::Serialize;
use uuid::Uuid;

use super::Pagination;

/// Admin view of a user account
#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_admin: bool,
    pub has_purchased: bool,
    pub certificate_issued: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for AdminUserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
            has_purchased: user.has_purchased,
            certificate_issued: user.certificate_url.is_some(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub total: i64,
    pub users: Vec<AdminUserView>,
}

/// Lists users, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<UsersResponse>> {
    let total = User::count(&state.db).await?;
    let users = User::list(&state.db, pagination.clamped_limit(), pagination.offset)
        .await?
        .into_iter()
        .map(AdminUserView::from)
        .collect();

    Ok(Json(UsersResponse { total, users }))
}
