/// Quiz and question models and database operations
///
/// Each quiz belongs to exactly one module (1:1, enforced by a unique
/// constraint on `module_id`) and holds an ordered list of questions.
/// A quiz is created or replaced together with its questions in a single
/// transaction; an empty question list is rejected before this layer is
/// reached, so a stored quiz always has at least one question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// A per-module assessment with a pass threshold
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quiz {
    /// Unique quiz ID
    pub id: Uuid,

    /// The module this quiz assesses (1:1)
    pub module_id: Uuid,

    /// Display title
    pub title: String,

    /// Minimum score percentage required to pass (0-100)
    pub passing_score: i32,

    /// When the quiz was created
    pub created_at: DateTime<Utc>,

    /// When the quiz was last updated
    pub updated_at: DateTime<Utc>,
}

/// A single multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    /// Unique question ID
    pub id: Uuid,

    /// Owning quiz
    pub quiz_id: Uuid,

    /// Position within the quiz (ascending)
    pub position: i32,

    /// Question text
    pub prompt: String,

    /// Answer options
    pub options: Json<Vec<String>>,

    /// Index of the correct option within `options`
    pub correct_index: i32,
}

/// Input for a question when creating or replacing a quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: i32,
}

/// Input for creating a new quiz with its questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuiz {
    pub module_id: Uuid,
    pub title: String,
    pub passing_score: i32,
    pub questions: Vec<CreateQuestion>,
}

/// Input for replacing an existing quiz and its question list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuiz {
    pub title: String,
    pub passing_score: i32,
    pub questions: Vec<CreateQuestion>,
}

impl Quiz {
    /// Creates a quiz and its questions in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the module already has a quiz (unique
    /// constraint on `module_id`) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateQuiz) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (module_id, title, passing_score)
            VALUES ($1, $2, $3)
            RETURNING id, module_id, title, passing_score, created_at, updated_at
            "#,
        )
        .bind(data.module_id)
        .bind(data.title)
        .bind(data.passing_score)
        .fetch_one(&mut *tx)
        .await?;

        insert_questions(&mut tx, quiz.id, &data.questions).await?;

        tx.commit().await?;

        Ok(quiz)
    }

    /// Finds a quiz by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, module_id, title, passing_score, created_at, updated_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(quiz)
    }

    /// Finds the quiz attached to a module, if any
    pub async fn find_by_module(
        pool: &PgPool,
        module_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, module_id, title, passing_score, created_at, updated_at
            FROM quizzes
            WHERE module_id = $1
            "#,
        )
        .bind(module_id)
        .fetch_optional(pool)
        .await?;

        Ok(quiz)
    }

    /// Loads the quiz's questions in position order
    pub async fn questions(pool: &PgPool, quiz_id: Uuid) -> Result<Vec<Question>, sqlx::Error> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, quiz_id, position, prompt, options, correct_index
            FROM questions
            WHERE quiz_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(pool)
        .await?;

        Ok(questions)
    }

    /// Replaces a quiz's metadata and its entire question list
    ///
    /// The old questions are deleted and the new list inserted in the
    /// same transaction, so readers never observe a half-replaced quiz.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateQuiz,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET title = $2, passing_score = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, module_id, title, passing_score, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.passing_score)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(quiz) = quiz else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_questions(&mut tx, id, &data.questions).await?;

        tx.commit().await?;

        Ok(Some(quiz))
    }

    /// Deletes a quiz (and, by cascade, its questions and attempts)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all quizzes
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, module_id, title, passing_score, created_at, updated_at
            FROM quizzes
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(quizzes)
    }
}

async fn insert_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    quiz_id: Uuid,
    questions: &[CreateQuestion],
) -> Result<(), sqlx::Error> {
    for (position, question) in questions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO questions (quiz_id, position, prompt, options, correct_index)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(quiz_id)
        .bind(position as i32)
        .bind(&question.prompt)
        .bind(Json(&question.options))
        .bind(question.correct_index)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
