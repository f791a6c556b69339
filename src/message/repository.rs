//! Message repository for postbox.

use sqlx::SqlitePool;

use super::types::{Message, NewMessage};
use crate::db::escape_like;
use crate::{PostboxError, Result};

/// Repository for message rows.
///
/// Messages are written once and never updated; fan-out sends create them
/// inside the delivery transaction instead of through [`create`].
///
/// [`create`]: MessageRepository::create
pub struct MessageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new MessageRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a message row outside a delivery transaction.
    pub async fn create(&self, new_message: &NewMessage) -> Result<Message> {
        let result = sqlx::query("INSERT INTO messages (sender_id, subject, body) VALUES (?, ?, ?)")
            .bind(new_message.sender_id)
            .bind(&new_message.subject)
            .bind(&new_message.body)
            .execute(self.pool)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("message".to_string()))
    }

    /// Get a message by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Message>> {
        let result = sqlx::query_as::<_, Message>(
            "SELECT id, sender_id, subject, body, status, created_at
             FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// List messages sent by an account, newest first.
    pub async fn list_by_sender(&self, sender_id: i64) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, sender_id, subject, body, status, created_at
             FROM messages WHERE sender_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(sender_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(messages)
    }

    /// Search an account's sent messages by substring in subject or body.
    pub async fn search_by_sender(&self, sender_id: i64, keyword: &str) -> Result<Vec<Message>> {
        let pattern = format!("%{}%", escape_like(keyword));

        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, sender_id, subject, body, status, created_at
             FROM messages
             WHERE sender_id = ?
               AND (subject LIKE ? ESCAPE '\\' OR body LIKE ? ESCAPE '\\')
             ORDER BY created_at DESC, id DESC",
        )
        .bind(sender_id)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(messages)
    }

    /// Count all messages.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
