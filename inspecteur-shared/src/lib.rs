//! # Inspecteur Auto Shared Library
//!
//! This crate contains the models, authentication utilities, and business
//! logic shared between the Inspecteur Auto API server and its tooling.
//!
//! ## Module Organization
//!
//! - `models`: Database models and CRUD operations
//! - `auth`: JWT tokens, password hashing, axum middleware
//! - `db`: Connection pool and migration runner
//! - `progression`: Module access-control gate
//! - `scoring`: Quiz scoring engine
//! - `services`: Outbound providers (email, chat, payments, certificates)

pub mod auth;
pub mod db;
pub mod models;
pub mod progression;
pub mod scoring;
pub mod services;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
