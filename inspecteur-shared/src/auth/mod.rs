/// Authentication and authorization utilities
///
/// This module provides the authentication primitives for the platform:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: Bearer token generation and validation
/// - [`middleware`]: Axum middleware (bearer auth, admin guard)
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Bearer Tokens**: HS256-signed JWTs with the user's email as the
///   subject claim and a short, configurable expiry (no refresh flow)
/// - **Constant-time Comparison**: password verification is constant-time
///
/// # Example
///
/// ```no_run
/// use inspecteur_shared::auth::password::{hash_password, verify_password};
/// use inspecteur_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new("student@example.com", 30);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
