//! Delivery link repository for postbox.

use sqlx::SqlitePool;

use super::types::DeliveryLink;
use crate::{PostboxError, Result};

/// Repository for per-recipient delivery links.
///
/// Flag updates are compare-and-set: each UPDATE names the state it expects
/// and reports through the affected-row count whether it won. Callers decide
/// whether a lost race is a conflict or a no-op.
pub struct LinkRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LinkRepository<'a> {
    /// Create a new LinkRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a link outside a delivery transaction.
    ///
    /// Fan-out sends create their links inside the delivery transaction
    /// instead; this exists for single-recipient flows and tests.
    pub async fn create(&self, message_id: i64, recipient_id: i64) -> Result<DeliveryLink> {
        let result =
            sqlx::query("INSERT INTO delivery_links (message_id, recipient_id) VALUES (?, ?)")
                .bind(message_id)
                .bind(recipient_id)
                .execute(self.pool)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("delivery link".to_string()))
    }

    /// Get a link by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<DeliveryLink>> {
        let result = sqlx::query_as::<_, DeliveryLink>(
            "SELECT id, message_id, recipient_id, is_read, is_deleted
             FROM delivery_links WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get the link a recipient holds for a message, if any.
    pub async fn get_by_message_and_recipient(
        &self,
        message_id: i64,
        recipient_id: i64,
    ) -> Result<Option<DeliveryLink>> {
        let result = sqlx::query_as::<_, DeliveryLink>(
            "SELECT id, message_id, recipient_id, is_read, is_deleted
             FROM delivery_links WHERE message_id = ? AND recipient_id = ?",
        )
        .bind(message_id)
        .bind(recipient_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// List all links for a message in creation order.
    pub async fn list_by_message(&self, message_id: i64) -> Result<Vec<DeliveryLink>> {
        let links = sqlx::query_as::<_, DeliveryLink>(
            "SELECT id, message_id, recipient_id, is_read, is_deleted
             FROM delivery_links WHERE message_id = ? ORDER BY id",
        )
        .bind(message_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(links)
    }

    /// Count a recipient's unread, non-deleted links.
    pub async fn count_unread(&self, recipient_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM delivery_links
             WHERE recipient_id = ? AND is_read = 0 AND is_deleted = 0",
        )
        .bind(recipient_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// Set the read flag. Returns false if it was already set.
    pub async fn mark_as_read(&self, link_id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE delivery_links SET is_read = 1 WHERE id = ? AND is_read = 0")
                .bind(link_id)
                .execute(self.pool)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the deleted flag. Returns false if it was already set.
    pub async fn mark_deleted(&self, link_id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE delivery_links SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
                .bind(link_id)
                .execute(self.pool)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear the deleted flag on restore. Returns false if it was not set.
    ///
    /// The read flag is untouched, so a restored message keeps its read state.
    pub async fn clear_deleted(&self, link_id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE delivery_links SET is_deleted = 0 WHERE id = ? AND is_deleted = 1")
                .bind(link_id)
                .execute(self.pool)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
