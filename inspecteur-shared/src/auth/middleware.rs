/// Authentication middleware for Axum
///
/// This module provides the bearer-token middleware and the admin guard.
/// The bearer middleware validates the JWT from the Authorization header,
/// resolves the subject email to a user row, and injects an [`AuthContext`]
/// into request extensions. Resolving the row on every request means admin
/// and purchase state always reflect the database, not a stale token.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use inspecteur_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.email)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor after the bearer
/// middleware has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Authenticated user email (the token's subject claim)
    pub email: String,

    /// Display name, when the user provided one
    pub name: Option<String>,

    /// Whether the user has the admin flag
    pub is_admin: bool,

    /// Whether the user has purchased the course
    pub has_purchased: bool,
}

impl AuthContext {
    /// Creates an auth context from a resolved user row
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.is_admin,
            has_purchased: user.has_purchased,
        }
    }

    /// Display name for documents and mail: the name when present,
    /// otherwise the email
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token subject does not resolve to a user
    UnknownUser,

    /// Authenticated but not an admin
    AdminRequired,

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::UnknownUser => {
                (StatusCode::UNAUTHORIZED, "Unknown user").into_response()
            }
            AuthError::AdminRequired => {
                (StatusCode::FORBIDDEN, "Admin access required").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Bearer-token authentication middleware
///
/// Validates the JWT from the `Authorization: Bearer <token>` header,
/// resolves the subject email to a user row, and injects [`AuthContext`].
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing
/// - Token format is invalid
/// - Token validation fails or the token has expired
/// - The subject email no longer matches a user
pub async fn bearer_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = validate_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    // Resolve the subject email to a user row
    let user = User::find_by_email(&pool, &claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or(AuthError::UnknownUser)?;

    let auth_context = AuthContext::from_user(&user);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Admin guard middleware
///
/// Must run after [`bearer_auth_middleware`]; rejects requests whose
/// auth context does not carry the admin flag.
///
/// # Errors
///
/// Returns 403 Forbidden for non-admin users, 401 if no auth context is
/// present (the bearer layer did not run).
pub async fn require_admin_middleware(req: Request, next: Next) -> Result<Response, AuthError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or(AuthError::MissingCredentials)?;

    if !auth.is_admin {
        return Err(AuthError::AdminRequired);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(is_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "student@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            name: Some("Test Student".to_string()),
            is_admin,
            has_purchased: false,
            certificate_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_auth_context_from_user() {
        let user = sample_user(false);
        let context = AuthContext::from_user(&user);

        assert_eq!(context.user_id, user.id);
        assert_eq!(context.email, user.email);
        assert!(!context.is_admin);
        assert!(!context.has_purchased);
        assert_eq!(context.display_name(), "Test Student");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = sample_user(false);
        user.name = None;
        let context = AuthContext::from_user(&user);
        assert_eq!(context.display_name(), "student@example.com");
    }

    #[test]
    fn test_auth_context_from_admin_user() {
        let user = sample_user(true);
        let context = AuthContext::from_user(&user);
        assert!(context.is_admin);
    }

    #[test]
    fn test_auth_error_into_response() {
        let err = AuthError::MissingCredentials;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = AuthError::InvalidFormat("test".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err = AuthError::AdminRequired;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let err = AuthError::DatabaseError("test".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
