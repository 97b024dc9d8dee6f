/// Admin quiz CRUD and attempt analytics
///
/// # Endpoints
///
/// - `GET    /v1/admin/quizzes` - All quizzes
/// - `POST   /v1/admin/quizzes` - Create a quiz with its questions
/// - `GET    /v1/admin/quizzes/{id}` - Quiz with questions (answers included)
/// - `PUT    /v1/admin/quizzes/{id}` - Replace metadata and question list
/// - `DELETE /v1/admin/quizzes/{id}` - Delete a quiz
/// - `GET    /v1/admin/quizzes/{id}/attempts` - Attempt history
///
/// A quiz must carry at least one question and every `correct_index`
/// must point into its options; an empty question list is a validation
/// error, never a stored quiz.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use inspecteur_shared::models::module::Module;
use inspecteur_shared::models::quiz::{CreateQuestion, CreateQuiz, Question, Quiz, UpdateQuiz};
use inspecteur_shared::models::quiz_attempt::QuizAttempt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Pagination;

/// Question input
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRequest {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: i32,
}

/// Quiz creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    pub module_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(range(min = 0, max = 100, message = "passing_score must be 0-100"))]
    pub passing_score: i32,

    pub questions: Vec<QuestionRequest>,
}

/// Quiz replacement request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(range(min = 0, max = 100, message = "passing_score must be 0-100"))]
    pub passing_score: i32,

    pub questions: Vec<QuestionRequest>,
}

/// Quiz with its questions, answers included (admin view)
#[derive(Debug, Serialize)]
pub struct QuizWithQuestions {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

/// Attempt history response
#[derive(Debug, Serialize)]
pub struct AttemptsResponse {
    pub total: i64,
    pub attempts: Vec<QuizAttempt>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Validates a question list beyond what derive can express
///
/// The zero-question quiz is rejected here at creation time; the scorer
/// additionally guards against it at runtime.
fn validate_questions(questions: &[QuestionRequest]) -> Result<Vec<CreateQuestion>, ApiError> {
    if questions.is_empty() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "questions".to_string(),
            message: "A quiz must have at least one question".to_string(),
        }]));
    }

    let mut validated = Vec::with_capacity(questions.len());
    for (index, question) in questions.iter().enumerate() {
        if question.prompt.trim().is_empty() {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: format!("questions[{}].prompt", index),
                message: "Prompt must not be empty".to_string(),
            }]));
        }

        if question.options.len() < 2 {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: format!("questions[{}].options", index),
                message: "A question needs at least two options".to_string(),
            }]));
        }

        let option_count = question.options.len() as i32;
        if question.correct_index < 0 || question.correct_index >= option_count {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: format!("questions[{}].correct_index", index),
                message: format!("correct_index must be in 0..{}", option_count),
            }]));
        }

        validated.push(CreateQuestion {
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            correct_index: question.correct_index,
        });
    }

    Ok(validated)
}

/// Lists all quizzes
pub async fn list_quizzes(State(state): State<AppState>) -> ApiResult<Json<Vec<Quiz>>> {
    let quizzes = Quiz::list(&state.db).await?;
    Ok(Json(quizzes))
}

/// Creates a quiz with its questions
///
/// # Errors
///
/// - `409 Conflict`: The module already has a quiz
/// - `422 Unprocessable Entity`: Empty question list or bad indices
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(req): Json<CreateQuizRequest>,
) -> ApiResult<Json<Quiz>> {
    req.validate()?;
    let questions = validate_questions(&req.questions)?;

    Module::find_by_id(&state.db, req.module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    let quiz = Quiz::create(
        &state.db,
        CreateQuiz {
            module_id: req.module_id,
            title: req.title,
            passing_score: req.passing_score,
            questions,
        },
    )
    .await?;

    Ok(Json(quiz))
}

/// Returns a quiz with its questions, correct answers included
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QuizWithQuestions>> {
    let quiz = Quiz::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    let questions = Quiz::questions(&state.db, quiz.id).await?;

    Ok(Json(QuizWithQuestions { quiz, questions }))
}

/// Replaces a quiz's metadata and question list
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuizRequest>,
) -> ApiResult<Json<Quiz>> {
    req.validate()?;
    let questions = validate_questions(&req.questions)?;

    let quiz = Quiz::update(
        &state.db,
        id,
        UpdateQuiz {
            title: req.title,
            passing_score: req.passing_score,
            questions,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

/// Deletes a quiz
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = Quiz::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }

    Ok(Json(DeleteResponse { id, deleted }))
}

/// Attempt history for a quiz (newest first)
pub async fn list_attempts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<AttemptsResponse>> {
    let quiz = Quiz::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    let total = QuizAttempt::count_by_quiz(&state.db, quiz.id).await?;
    let attempts = QuizAttempt::list_by_quiz(
        &state.db,
        quiz.id,
        pagination.clamped_limit(),
        pagination.offset,
    )
    .await?;

    Ok(Json(AttemptsResponse { total, attempts }))
}
