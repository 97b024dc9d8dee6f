/// Database models for the Inspecteur Auto platform
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Learner and admin accounts
/// - `module`: Ordered course content units
/// - `quiz`: Per-module assessments and their questions
/// - `quiz_attempt`: Append-only scoring history
/// - `module_progress`: Per-(user, module) completion records
/// - `checkout_session`: Local record of Stripe checkout sessions
/// - `message`: Student/admin messaging
///
/// # Example
///
/// ```no_run
/// use inspecteur_shared::models::user::{CreateUser, User};
/// use inspecteur_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "student@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("Jean Dupont".to_string()),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod checkout_session;
pub mod message;
pub mod module;
pub mod module_progress;
pub mod quiz;
pub mod quiz_attempt;
pub mod user;
