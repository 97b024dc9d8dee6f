/// Quiz attempt model and database operations
///
/// Attempts are append-only: every submission creates a new row, retakes
/// included. The progression gate asks "does any passing attempt exist";
/// the admin panel reads counts and full history for analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// One scored quiz submission
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuizAttempt {
    /// Unique attempt ID
    pub id: Uuid,

    /// The user who submitted
    pub user_id: Uuid,

    /// The quiz that was taken
    pub quiz_id: Uuid,

    /// Submitted answers (question_id → selected option index)
    pub answers: Json<HashMap<Uuid, i32>>,

    /// Number of correctly answered questions
    pub correct_count: i32,

    /// Number of questions in the quiz at submission time
    pub total_questions: i32,

    /// Score as a percentage in [0, 100]
    pub score_percent: f64,

    /// Whether the score met the quiz's passing threshold
    pub passed: bool,

    /// When the attempt was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for recording a scored attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizAttempt {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub answers: HashMap<Uuid, i32>,
    pub correct_count: i32,
    pub total_questions: i32,
    pub score_percent: f64,
    pub passed: bool,
}

impl QuizAttempt {
    /// Records a new attempt
    ///
    /// No dedup is performed: repeated identical submissions create
    /// repeated rows, since retaking is allowed.
    pub async fn create(pool: &PgPool, data: CreateQuizAttempt) -> Result<Self, sqlx::Error> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts
                (user_id, quiz_id, answers, correct_count, total_questions, score_percent, passed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, quiz_id, answers, correct_count, total_questions,
                      score_percent, passed, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.quiz_id)
        .bind(Json(data.answers))
        .bind(data.correct_count)
        .bind(data.total_questions)
        .bind(data.score_percent)
        .bind(data.passed)
        .fetch_one(pool)
        .await?;

        Ok(attempt)
    }

    /// Checks whether the user has any passing attempt for the quiz
    pub async fn has_passing(
        pool: &PgPool,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM quiz_attempts
                WHERE user_id = $1 AND quiz_id = $2 AND passed = TRUE
            )
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists attempts for a quiz, newest first (admin analytics)
    pub async fn list_by_quiz(
        pool: &PgPool,
        quiz_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT id, user_id, quiz_id, answers, correct_count, total_questions,
                   score_percent, passed, created_at
            FROM quiz_attempts
            WHERE quiz_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(quiz_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(attempts)
    }

    /// Counts attempts for a quiz
    pub async fn count_by_quiz(pool: &PgPool, quiz_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1")
                .bind(quiz_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Counts all attempts made by a user
    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM quiz_attempts WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
