/// Module access-control gate
///
/// Decides whether a user may access a given module. The decision itself
/// is a pure function over purchase state and predecessor state, so it
/// can be tested without a database; [`check_access`] is the async
/// wrapper that gathers those facts with at most three lookups and is
/// what route handlers call.
///
/// Rules, in order:
///
/// 1. A free module is always accessible.
/// 2. Without a purchase, every non-free module is blocked.
/// 3. The first module of the sequence (no predecessor) is accessible.
/// 4. The predecessor must be completed.
/// 5. If the predecessor has a quiz, it must have a passing attempt.
///
/// Each request evaluates independently over current data; the gate holds
/// no state and is idempotent.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use uuid::Uuid;

use crate::models::{
    module::Module, module_progress::ModuleProgress, quiz::Quiz, quiz_attempt::QuizAttempt,
};

/// Why access to a module was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The course has not been purchased
    PurchaseRequired,

    /// The preceding module's content has not been completed
    PreviousModuleNotCompleted,

    /// The preceding module's quiz has no passing attempt
    PreviousQuizNotPassed,
}

impl BlockReason {
    /// Wire representation, used in API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::PurchaseRequired => "purchase_required",
            BlockReason::PreviousModuleNotCompleted => "previous_module_not_completed",
            BlockReason::PreviousQuizNotPassed => "previous_quiz_not_passed",
        }
    }

    /// Human-readable explanation
    pub fn message(&self) -> &'static str {
        match self {
            BlockReason::PurchaseRequired => "This module requires purchasing the course",
            BlockReason::PreviousModuleNotCompleted => {
                "The previous module must be completed first"
            }
            BlockReason::PreviousQuizNotPassed => "The previous module's quiz must be passed first",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The module may be accessed
    Allowed,

    /// Access denied, with the first rule that failed
    Blocked(BlockReason),
}

impl AccessDecision {
    /// Whether the decision grants access
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    /// The block reason, if any
    pub fn reason(&self) -> Option<BlockReason> {
        match self {
            AccessDecision::Allowed => None,
            AccessDecision::Blocked(reason) => Some(*reason),
        }
    }
}

/// State of the target's predecessor module, as seen by one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredecessorState {
    /// Whether the predecessor's content is completed
    pub completed: bool,

    /// Predecessor quiz result: None = no quiz exists,
    /// Some(passed) = a quiz exists and `passed` says whether any
    /// passing attempt is on record
    pub quiz_passed: Option<bool>,
}

/// Everything the gate needs to decide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInput {
    /// Whether the target module is free
    pub target_is_free: bool,

    /// Whether the user has purchased the course
    pub has_purchased: bool,

    /// Predecessor state; None = the target is first in the sequence
    pub predecessor: Option<PredecessorState>,
}

/// Evaluates the gate rules over pre-fetched state
///
/// Pure and total: every input produces exactly one decision, and the
/// first failing rule wins.
pub fn evaluate(input: &GateInput) -> AccessDecision {
    if input.target_is_free {
        return AccessDecision::Allowed;
    }

    if !input.has_purchased {
        return AccessDecision::Blocked(BlockReason::PurchaseRequired);
    }

    let Some(predecessor) = input.predecessor else {
        return AccessDecision::Allowed;
    };

    if !predecessor.completed {
        return AccessDecision::Blocked(BlockReason::PreviousModuleNotCompleted);
    }

    if predecessor.quiz_passed == Some(false) {
        return AccessDecision::Blocked(BlockReason::PreviousQuizNotPassed);
    }

    AccessDecision::Allowed
}

/// Decides whether a user may access `module`, fetching the gate's inputs
///
/// Performs at most three lookups: the predecessor module, the user's
/// progress on it, and (when the predecessor has a quiz) whether a
/// passing attempt exists. Free modules short-circuit without touching
/// the database.
pub async fn check_access(
    pool: &PgPool,
    user_id: Uuid,
    has_purchased: bool,
    module: &Module,
) -> Result<AccessDecision, sqlx::Error> {
    if module.is_free {
        return Ok(AccessDecision::Allowed);
    }

    if !has_purchased {
        return Ok(AccessDecision::Blocked(BlockReason::PurchaseRequired));
    }

    let Some(predecessor) = Module::find_predecessor(pool, module.order_index).await? else {
        return Ok(AccessDecision::Allowed);
    };

    let completed = ModuleProgress::find(pool, user_id, predecessor.id)
        .await?
        .map(|p| p.completed)
        .unwrap_or(false);

    let quiz_passed = match Quiz::find_by_module(pool, predecessor.id).await? {
        Some(quiz) => Some(QuizAttempt::has_passing(pool, user_id, quiz.id).await?),
        None => None,
    };

    Ok(evaluate(&GateInput {
        target_is_free: module.is_free,
        has_purchased,
        predecessor: Some(PredecessorState {
            completed,
            quiz_passed,
        }),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid_with_predecessor(completed: bool, quiz_passed: Option<bool>) -> GateInput {
        GateInput {
            target_is_free: false,
            has_purchased: true,
            predecessor: Some(PredecessorState {
                completed,
                quiz_passed,
            }),
        }
    }

    #[test]
    fn test_free_module_always_allowed() {
        // Accessible regardless of purchase state
        let input = GateInput {
            target_is_free: true,
            has_purchased: false,
            predecessor: None,
        };
        assert_eq!(evaluate(&input), AccessDecision::Allowed);

        let input = GateInput {
            target_is_free: true,
            has_purchased: false,
            predecessor: Some(PredecessorState {
                completed: false,
                quiz_passed: Some(false),
            }),
        };
        assert_eq!(evaluate(&input), AccessDecision::Allowed);
    }

    #[test]
    fn test_unpurchased_blocked_on_paid_modules() {
        let input = GateInput {
            target_is_free: false,
            has_purchased: false,
            predecessor: None,
        };
        assert_eq!(
            evaluate(&input),
            AccessDecision::Blocked(BlockReason::PurchaseRequired)
        );
    }

    #[test]
    fn test_first_paid_module_allowed_after_purchase() {
        let input = GateInput {
            target_is_free: false,
            has_purchased: true,
            predecessor: None,
        };
        assert_eq!(evaluate(&input), AccessDecision::Allowed);
    }

    #[test]
    fn test_blocked_when_predecessor_not_completed() {
        let input = paid_with_predecessor(false, None);
        assert_eq!(
            evaluate(&input),
            AccessDecision::Blocked(BlockReason::PreviousModuleNotCompleted)
        );
    }

    #[test]
    fn test_blocked_when_predecessor_quiz_not_passed() {
        // Module completed but its quiz never passed: still blocked
        let input = paid_with_predecessor(true, Some(false));
        assert_eq!(
            evaluate(&input),
            AccessDecision::Blocked(BlockReason::PreviousQuizNotPassed)
        );
    }

    #[test]
    fn test_allowed_when_predecessor_done_and_quiz_passed() {
        let input = paid_with_predecessor(true, Some(true));
        assert_eq!(evaluate(&input), AccessDecision::Allowed);
    }

    #[test]
    fn test_allowed_when_predecessor_has_no_quiz() {
        // Completion alone unlocks the successor when no quiz exists
        let input = paid_with_predecessor(true, None);
        assert_eq!(evaluate(&input), AccessDecision::Allowed);
    }

    #[test]
    fn test_incomplete_wins_over_quiz_not_passed() {
        // Rule order: completion is checked before the quiz
        let input = paid_with_predecessor(false, Some(false));
        assert_eq!(
            evaluate(&input),
            AccessDecision::Blocked(BlockReason::PreviousModuleNotCompleted)
        );
    }

    #[test]
    fn test_block_reason_wire_format() {
        assert_eq!(BlockReason::PurchaseRequired.as_str(), "purchase_required");
        assert_eq!(
            BlockReason::PreviousModuleNotCompleted.as_str(),
            "previous_module_not_completed"
        );
        assert_eq!(
            BlockReason::PreviousQuizNotPassed.as_str(),
            "previous_quiz_not_passed"
        );
    }

    #[test]
    fn test_decision_accessors() {
        assert!(AccessDecision::Allowed.is_allowed());
        assert_eq!(AccessDecision::Allowed.reason(), None);

        let blocked = AccessDecision::Blocked(BlockReason::PurchaseRequired);
        assert!(!blocked.is_allowed());
        assert_eq!(blocked.reason(), Some(BlockReason::PurchaseRequired));
    }
}
