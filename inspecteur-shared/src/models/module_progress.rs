/// Module progress model and database operations
///
/// One row per (user, module), written with an upsert so repeated
/// completion calls are idempotent. The first completion timestamp is
/// preserved across repeats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Completion record for one user and one module
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ModuleProgress {
    /// Unique progress row ID
    pub id: Uuid,

    /// The learner
    pub user_id: Uuid,

    /// The module
    pub module_id: Uuid,

    /// Whether the module's content has been completed
    pub completed: bool,

    /// When the module was first completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl ModuleProgress {
    /// Marks a module completed for a user (idempotent upsert)
    ///
    /// Repeat calls keep the original `completed_at`.
    pub async fn upsert_completed(
        pool: &PgPool,
        user_id: Uuid,
        module_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let progress = sqlx::query_as::<_, ModuleProgress>(
            r#"
            INSERT INTO module_progress (user_id, module_id, completed, completed_at)
            VALUES ($1, $2, TRUE, NOW())
            ON CONFLICT (user_id, module_id)
            DO UPDATE SET
                completed = TRUE,
                completed_at = COALESCE(module_progress.completed_at, NOW())
            RETURNING id, user_id, module_id, completed, completed_at
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_one(pool)
        .await?;

        Ok(progress)
    }

    /// Finds the progress row for a (user, module) pair
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        module_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let progress = sqlx::query_as::<_, ModuleProgress>(
            r#"
            SELECT id, user_id, module_id, completed, completed_at
            FROM module_progress
            WHERE user_id = $1 AND module_id = $2
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(pool)
        .await?;

        Ok(progress)
    }

    /// Counts the modules a user has completed
    pub async fn count_completed(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM module_progress WHERE user_id = $1 AND completed = TRUE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Lists a user's progress rows
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ModuleProgress>(
            r#"
            SELECT id, user_id, module_id, completed, completed_at
            FROM module_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
