/// Checkout session model and database operations
///
/// A local record of every Stripe checkout session we create, so the
/// polling reconciliation path can resolve a session id back to a user
/// and so the admin panel can see payment activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Session lifecycle states as stored in the `status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, payment not yet observed
    Pending,

    /// Payment observed (webhook or polling)
    Completed,

    /// Session expired without payment
    Expired,
}

impl SessionStatus {
    /// Column representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
        }
    }
}

/// Local record of one Stripe checkout session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CheckoutSession {
    /// Unique row ID
    pub id: Uuid,

    /// The purchasing user
    pub user_id: Uuid,

    /// Stripe's session id ("cs_...")
    pub stripe_session_id: String,

    /// Lifecycle state ("pending" | "completed" | "expired")
    pub status: String,

    /// Amount charged, in cents
    pub amount_cents: i32,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Records a newly created checkout session as pending
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        stripe_session_id: &str,
        amount_cents: i32,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, CheckoutSession>(
            r#"
            INSERT INTO checkout_sessions (user_id, stripe_session_id, status, amount_cents)
            VALUES ($1, $2, 'pending', $3)
            RETURNING id, user_id, stripe_session_id, status, amount_cents,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(stripe_session_id)
        .bind(amount_cents)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by its Stripe session id
    pub async fn find_by_stripe_id(
        pool: &PgPool,
        stripe_session_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, CheckoutSession>(
            r#"
            SELECT id, user_id, stripe_session_id, status, amount_cents,
                   created_at, updated_at
            FROM checkout_sessions
            WHERE stripe_session_id = $1
            "#,
        )
        .bind(stripe_session_id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Sets a session's lifecycle state (idempotent)
    pub async fn set_status(
        pool: &PgPool,
        stripe_session_id: &str,
        status: SessionStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE checkout_sessions
            SET status = $2, updated_at = NOW()
            WHERE stripe_session_id = $1
            "#,
        )
        .bind(stripe_session_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_as_str() {
        assert_eq!(SessionStatus::Pending.as_str(), "pending");
        assert_eq!(SessionStatus::Completed.as_str(), "completed");
        assert_eq!(SessionStatus::Expired.as_str(), "expired");
    }
}
