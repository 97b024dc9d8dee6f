/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new learner account
/// - `POST /v1/auth/login` - Login and get a bearer token
/// - `GET  /v1/me` - Current profile (authenticated)
///
/// Tokens are short-lived (default 30 minutes) and carry the user's
/// email as the subject claim; there is no refresh flow.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use inspecteur_shared::auth::middleware::AuthContext;
use inspecteur_shared::auth::{jwt, password};
use inspecteur_shared::models::user::{CreateUser, User};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (strength-checked separately)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Register / login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// User ID
    pub user_id: Uuid,

    /// Bearer token
    pub access_token: String,

    /// Token lifetime in minutes
    pub expires_in_minutes: i64,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Current-profile response (never exposes the password hash)
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_admin: bool,
    pub has_purchased: bool,
    pub certificate_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
            has_purchased: user.has_purchased,
            certificate_url: user.certificate_url,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Register a new learner account
///
/// Hashes the password, creates the user, sends a best-effort welcome
/// email, and returns a bearer token.
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    // Validate password strength
    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.clone(),
            password_hash,
            name: req.name.clone(),
        },
    )
    .await?;

    // Welcome mail is best-effort: a failure never fails registration
    let display_name = user.name.clone().unwrap_or_else(|| user.email.clone());
    if let Err(e) = state.email.send_welcome(&user.email, &display_name).await {
        warn!(user_id = %user.id, error = %e, "Welcome email failed");
    }

    let claims = jwt::Claims::new(&user.email, state.jwt_ttl_minutes());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        access_token,
        expires_in_minutes: state.jwt_ttl_minutes(),
    }))
}

/// Login with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    // Find user by email
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // Update last login
    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(&user.email, state.jwt_ttl_minutes());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        access_token,
        expires_in_minutes: state.jwt_ttl_minutes(),
    }))
}

/// Current profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from(user)))
}
