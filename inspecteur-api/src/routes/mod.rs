/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, current profile
/// - `modules`: Course catalog and gated module content
/// - `quizzes`: Quiz retrieval and submission
/// - `progress`: Access checks, completion, progress summary
/// - `payments`: Checkout sessions, status polling, webhook
/// - `chat`: AI course assistant
/// - `messages`: Student/admin messaging
/// - `admin`: Content CRUD and analytics (admin only)

pub mod admin;
pub mod auth;
pub mod chat;
pub mod health;
pub mod messages;
pub mod modules;
pub mod payments;
pub mod progress;
pub mod quizzes;
