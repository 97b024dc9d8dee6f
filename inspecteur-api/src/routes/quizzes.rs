/// Quiz endpoints
///
/// # Endpoints
///
/// - `GET  /v1/quizzes/module/{module_id}` - The module's quiz, questions
///   sanitized (no correct indices)
/// - `POST /v1/quizzes/{id}/submit` - Score a submission and record an
///   attempt
///
/// A quiz is gated exactly like its module. Every submission appends a
/// new attempt row: retakes are allowed and history is kept for the
/// admin panel.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use inspecteur_shared::auth::middleware::AuthContext;
use inspecteur_shared::models::{
    module::Module,
    quiz::{Question, Quiz},
    quiz_attempt::{CreateQuizAttempt, QuizAttempt},
};
use inspecteur_shared::{progression, scoring};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A question as shown to a learner (correct index withheld)
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub position: i32,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            position: question.position,
            prompt: question.prompt,
            options: question.options.0,
        }
    }
}

/// A quiz as shown to a learner
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub passing_score: i32,
    pub questions: Vec<QuestionView>,
}

/// Submission body: question id → selected option index
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: HashMap<Uuid, i32>,
}

/// Scored submission response
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub attempt_id: Uuid,
    pub quiz_id: Uuid,
    pub correct_count: i32,
    pub total_questions: i32,
    pub score_percent: f64,
    pub passing_score: i32,
    pub passed: bool,
    pub details: Vec<scoring::QuestionResult>,
}

/// Returns the quiz attached to a module, gated like the module itself
pub async fn get_module_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(module_id): Path<Uuid>,
) -> ApiResult<Json<QuizView>> {
    let module = Module::find_by_id(&state.db, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    let decision =
        progression::check_access(&state.db, auth.user_id, auth.has_purchased, &module).await?;
    if let Some(reason) = decision.reason() {
        return Err(ApiError::AccessBlocked(reason));
    }

    let quiz = Quiz::find_by_module(&state.db, module.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("This module has no quiz".to_string()))?;

    let questions = Quiz::questions(&state.db, quiz.id).await?;

    Ok(Json(QuizView {
        id: quiz.id,
        module_id: quiz.module_id,
        title: quiz.title,
        passing_score: quiz.passing_score,
        questions: questions.into_iter().map(QuestionView::from).collect(),
    }))
}

/// Scores a submission and records the attempt
///
/// The gate is re-checked so a learner cannot submit against a locked
/// module's quiz by id. The response reveals per-question correctness.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitQuizRequest>,
) -> ApiResult<Json<SubmitQuizResponse>> {
    let quiz = Quiz::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    let module = Module::find_by_id(&state.db, quiz.module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    let decision =
        progression::check_access(&state.db, auth.user_id, auth.has_purchased, &module).await?;
    if let Some(reason) = decision.reason() {
        return Err(ApiError::AccessBlocked(reason));
    }

    let questions = Quiz::questions(&state.db, quiz.id).await?;

    let outcome = scoring::score(&questions, &req.answers, quiz.passing_score);

    let attempt = QuizAttempt::create(
        &state.db,
        CreateQuizAttempt {
            user_id: auth.user_id,
            quiz_id: quiz.id,
            answers: req.answers,
            correct_count: outcome.correct_count,
            total_questions: outcome.total_questions,
            score_percent: outcome.score_percent,
            passed: outcome.passed,
        },
    )
    .await?;

    Ok(Json(SubmitQuizResponse {
        attempt_id: attempt.id,
        quiz_id: quiz.id,
        correct_count: outcome.correct_count,
        total_questions: outcome.total_questions,
        score_percent: outcome.score_percent,
        passing_score: quiz.passing_score,
        passed: outcome.passed,
        details: outcome.details,
    }))
}
