/// Quiz scoring engine
///
/// Scores a submission against a quiz's question list. A missing answer
/// is treated as the sentinel index −1, which can never match a stored
/// `correct_index` (those are non-negative by schema constraint). An
/// empty question list scores 0 and fails rather than dividing by zero;
/// quiz creation rejects empty lists so this only defends against data
/// edited out-of-band.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::quiz::Question;

/// Sentinel for "no answer submitted"; never matches a correct index
pub const MISSING_ANSWER: i32 = -1;

/// Per-question scoring detail, revealed to the learner after submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    /// The question scored
    pub question_id: Uuid,

    /// The submitted option index (−1 if unanswered)
    pub selected_index: i32,

    /// The correct option index
    pub correct_index: i32,

    /// Whether the submitted answer was correct
    pub correct: bool,
}

/// Result of scoring one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Number of correctly answered questions
    pub correct_count: i32,

    /// Number of questions in the quiz
    pub total_questions: i32,

    /// Score as a percentage in [0, 100]
    pub score_percent: f64,

    /// Whether the score met the passing threshold
    pub passed: bool,

    /// Per-question breakdown, in question order
    pub details: Vec<QuestionResult>,
}

/// Scores a submission against the quiz's questions
///
/// `answers` maps question id → selected option index. Unknown question
/// ids in the submission are ignored; questions absent from the
/// submission count as unanswered.
///
/// `passed == (score_percent >= passing_score)`; an empty question list
/// yields `score_percent == 0.0` and `passed == false` regardless of the
/// threshold.
pub fn score(
    questions: &[Question],
    answers: &HashMap<Uuid, i32>,
    passing_score: i32,
) -> ScoreOutcome {
    let total_questions = questions.len() as i32;

    let details: Vec<QuestionResult> = questions
        .iter()
        .map(|question| {
            let selected_index = answers.get(&question.id).copied().unwrap_or(MISSING_ANSWER);
            QuestionResult {
                question_id: question.id,
                selected_index,
                correct_index: question.correct_index,
                correct: selected_index == question.correct_index,
            }
        })
        .collect();

    let correct_count = details.iter().filter(|d| d.correct).count() as i32;

    // Guard the empty quiz: automatic fail, never a division by zero
    let (score_percent, passed) = if total_questions == 0 {
        (0.0, false)
    } else {
        let percent = 100.0 * f64::from(correct_count) / f64::from(total_questions);
        (percent, percent >= f64::from(passing_score))
    };

    ScoreOutcome {
        correct_count,
        total_questions,
        score_percent,
        passed,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn question(correct_index: i32) -> Question {
        Question {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            position: 0,
            prompt: "Quel est le jeu maximal autorisé ?".to_string(),
            options: Json(vec![
                "0,5 mm".to_string(),
                "1 mm".to_string(),
                "2 mm".to_string(),
            ]),
            correct_index,
        }
    }

    fn answers_for(questions: &[Question], picks: &[i32]) -> HashMap<Uuid, i32> {
        questions
            .iter()
            .zip(picks.iter())
            .map(|(q, &pick)| (q.id, pick))
            .collect()
    }

    #[test]
    fn test_four_of_five_at_threshold_eighty() {
        // 5 questions, passing 80, 4 correct: exactly 80.0, passed
        let questions: Vec<Question> = (0..5).map(|_| question(1)).collect();
        let answers = answers_for(&questions, &[1, 1, 1, 1, 0]);

        let outcome = score(&questions, &answers, 80);

        assert_eq!(outcome.correct_count, 4);
        assert_eq!(outcome.total_questions, 5);
        assert_eq!(outcome.score_percent, 80.0);
        assert!(outcome.passed);
    }

    #[test]
    fn test_below_threshold_fails() {
        let questions: Vec<Question> = (0..5).map(|_| question(2)).collect();
        let answers = answers_for(&questions, &[2, 2, 2, 0, 0]);

        let outcome = score(&questions, &answers, 80);

        assert_eq!(outcome.correct_count, 3);
        assert_eq!(outcome.score_percent, 60.0);
        assert!(!outcome.passed);
    }

    #[test]
    fn test_missing_answers_are_incorrect() {
        let questions: Vec<Question> = (0..4).map(|_| question(0)).collect();
        // Only answer the first two questions
        let answers = answers_for(&questions[..2], &[0, 0]);

        let outcome = score(&questions, &answers, 50);

        assert_eq!(outcome.correct_count, 2);
        assert_eq!(outcome.score_percent, 50.0);
        assert!(outcome.passed);

        assert_eq!(outcome.details[2].selected_index, MISSING_ANSWER);
        assert!(!outcome.details[2].correct);
        assert_eq!(outcome.details[3].selected_index, MISSING_ANSWER);
    }

    #[test]
    fn test_unknown_question_ids_ignored() {
        let questions = vec![question(1)];
        let mut answers = answers_for(&questions, &[1]);
        answers.insert(Uuid::new_v4(), 2);

        let outcome = score(&questions, &answers, 100);

        assert_eq!(outcome.total_questions, 1);
        assert_eq!(outcome.correct_count, 1);
        assert!(outcome.passed);
    }

    #[test]
    fn test_empty_quiz_fails_without_dividing() {
        let outcome = score(&[], &HashMap::new(), 0);

        assert_eq!(outcome.total_questions, 0);
        assert_eq!(outcome.correct_count, 0);
        assert_eq!(outcome.score_percent, 0.0);
        assert!(!outcome.passed);
        assert!(outcome.details.is_empty());
    }

    #[test]
    fn test_score_percent_bounds() {
        // All wrong → 0, all right → 100
        let questions: Vec<Question> = (0..3).map(|_| question(0)).collect();

        let all_wrong = answers_for(&questions, &[1, 1, 1]);
        let outcome = score(&questions, &all_wrong, 50);
        assert_eq!(outcome.score_percent, 0.0);
        assert!(!outcome.passed);

        let all_right = answers_for(&questions, &[0, 0, 0]);
        let outcome = score(&questions, &all_right, 100);
        assert_eq!(outcome.score_percent, 100.0);
        assert!(outcome.passed);
    }

    #[test]
    fn test_passed_matches_threshold_comparison() {
        let questions: Vec<Question> = (0..3).map(|_| question(0)).collect();
        let answers = answers_for(&questions, &[0, 0, 1]); // 2/3 ≈ 66.67

        for threshold in [0, 50, 66, 67, 100] {
            let outcome = score(&questions, &answers, threshold);
            assert_eq!(
                outcome.passed,
                outcome.score_percent >= f64::from(threshold),
                "threshold {}",
                threshold
            );
        }
    }

    #[test]
    fn test_details_follow_question_order() {
        let questions: Vec<Question> = (0..3).map(|_| question(0)).collect();
        let answers = answers_for(&questions, &[0, 1, 0]);

        let outcome = score(&questions, &answers, 50);

        let ids: Vec<Uuid> = outcome.details.iter().map(|d| d.question_id).collect();
        let expected: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, expected);
        assert!(outcome.details[0].correct);
        assert!(!outcome.details[1].correct);
    }
}
