/// Course module model and database operations
///
/// Modules are the ordered content units of the course. `order_index` is
/// unique but nothing assumes the sequence is gapless: the predecessor of
/// a module is "the module with the greatest smaller order_index", looked
/// up with an ordered query rather than `order_index - 1` arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A unit of course content with a position in the module sequence
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Module {
    /// Unique module ID
    pub id: Uuid,

    /// Display title
    pub title: String,

    /// Short description shown in the catalog
    pub description: String,

    /// Full content body (markdown)
    pub content: String,

    /// Optional video URL
    pub video_url: Option<String>,

    /// Position in the sequence (unique, ascending, not assumed gapless)
    pub order_index: i32,

    /// Whether this module is accessible without purchase
    pub is_free: bool,

    /// When the module was created
    pub created_at: DateTime<Utc>,

    /// When the module was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModule {
    pub title: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    pub order_index: i32,
    pub is_free: bool,
}

/// Input for replacing an existing module (full-replace PUT semantics)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateModule {
    pub title: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    pub order_index: i32,
    pub is_free: bool,
}

impl Module {
    /// Creates a new module
    ///
    /// # Errors
    ///
    /// Returns an error if `order_index` is already taken (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateModule) -> Result<Self, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            INSERT INTO modules (title, description, content, video_url, order_index, is_free)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, content, video_url, order_index, is_free,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.content)
        .bind(data.video_url)
        .bind(data.order_index)
        .bind(data.is_free)
        .fetch_one(pool)
        .await?;

        Ok(module)
    }

    /// Finds a module by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, title, description, content, video_url, order_index, is_free,
                   created_at, updated_at
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(module)
    }

    /// Finds the predecessor of a module in the sequence
    ///
    /// The predecessor is the module with the greatest `order_index`
    /// strictly below the given one. Returns `None` for the first module.
    pub async fn find_predecessor(
        pool: &PgPool,
        order_index: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, title, description, content, video_url, order_index, is_free,
                   created_at, updated_at
            FROM modules
            WHERE order_index < $1
            ORDER BY order_index DESC
            LIMIT 1
            "#,
        )
        .bind(order_index)
        .fetch_optional(pool)
        .await?;

        Ok(module)
    }

    /// Lists all modules in sequence order
    pub async fn list_ordered(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let modules = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, title, description, content, video_url, order_index, is_free,
                   created_at, updated_at
            FROM modules
            ORDER BY order_index ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(modules)
    }

    /// Replaces a module's fields (full-replace semantics)
    ///
    /// # Errors
    ///
    /// Returns an error if the new `order_index` collides with another
    /// module's.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateModule,
    ) -> Result<Option<Self>, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            UPDATE modules
            SET title = $2, description = $3, content = $4, video_url = $5,
                order_index = $6, is_free = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, content, video_url, order_index, is_free,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.content)
        .bind(data.video_url)
        .bind(data.order_index)
        .bind(data.is_free)
        .fetch_optional(pool)
        .await?;

        Ok(module)
    }

    /// Deletes a module by ID
    ///
    /// Cascades to its quiz, questions, attempts, and progress records.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts total number of modules
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM modules")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
