/// Messaging model and database operations
///
/// Students write to the admin inbox (`recipient_id` NULL); admins reply
/// to a specific user. A user's thread is everything they sent plus
/// everything addressed to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One message between a student and the admin team
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    /// Unique message ID
    pub id: Uuid,

    /// Author
    pub sender_id: Uuid,

    /// Addressee; None means the admin inbox
    pub recipient_id: Option<Uuid>,

    /// Message body
    pub body: String,

    /// When the addressee read the message
    pub read_at: Option<DateTime<Utc>>,

    /// When the message was sent
    pub created_at: DateTime<Utc>,
}

/// Input for sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessage {
    pub sender_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub body: String,
}

impl Message {
    /// Records a new message
    pub async fn create(pool: &PgPool, data: CreateMessage) -> Result<Self, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, sender_id, recipient_id, body, read_at, created_at
            "#,
        )
        .bind(data.sender_id)
        .bind(data.recipient_id)
        .bind(data.body)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    /// Finds a message by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, recipient_id, body, read_at, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(message)
    }

    /// Lists a user's thread: messages they sent or received, oldest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, recipient_id, body, read_at, created_at
            FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Lists the admin inbox (messages addressed to staff), newest first
    pub async fn list_admin_inbox(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, recipient_id, body, read_at, created_at
            FROM messages
            WHERE recipient_id IS NULL
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Marks a message read by its addressee
    ///
    /// A user may mark messages addressed to them; admins may also mark
    /// inbox messages (recipient NULL). Already-read messages are left
    /// untouched.
    pub async fn mark_read(
        pool: &PgPool,
        id: Uuid,
        reader_id: Uuid,
        reader_is_admin: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE id = $1
              AND read_at IS NULL
              AND (recipient_id = $2 OR (recipient_id IS NULL AND $3))
            "#,
        )
        .bind(id)
        .bind(reader_id)
        .bind(reader_is_admin)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
