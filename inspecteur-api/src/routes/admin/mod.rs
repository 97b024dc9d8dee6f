/// Admin panel route handlers
///
/// All routes under `/v1/admin` run behind the bearer layer plus the
/// admin guard; a valid token without the admin flag answers 403.
///
/// - `modules`: Module CRUD
/// - `quizzes`: Quiz CRUD and attempt analytics
/// - `users`: User listing
/// - `messages`: Inbox and replies

pub mod messages;
pub mod modules;
pub mod quizzes;
pub mod users;

use serde::Deserialize;

/// Common pagination query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    /// Page size (default 50, capped at 200)
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Rows to skip
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Pagination {
    /// Clamps the page size to a sane range
    pub fn clamped_limit(&self) -> i64 {
        self.limit.clamp(1, 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamp() {
        let p = Pagination {
            limit: 1000,
            offset: 0,
        };
        assert_eq!(p.clamped_limit(), 200);

        let p = Pagination {
            limit: 0,
            offset: 0,
        };
        assert_eq!(p.clamped_limit(), 1);
    }
}
