//! Trash repository for postbox.

use sqlx::SqlitePool;

use super::types::{TrashEntry, TrashedMail};
use crate::{PostboxError, Result};

/// Repository for trash entries.
///
/// The partial unique index on pending entries enforces at most one live
/// trash row per link; restored rows stay behind as history.
pub struct TrashRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TrashRepository<'a> {
    /// Create a new TrashRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a pending entry for a link, stamping the retention window.
    ///
    /// Fails if the link already has a pending entry.
    pub async fn add(&self, link_id: i64, retention_days: u32) -> Result<TrashEntry> {
        let result = sqlx::query(
            "INSERT INTO trash_entries (link_id, expires_at)
             VALUES (?, datetime('now', '+' || ? || ' days'))",
        )
        .bind(link_id)
        .bind(i64::from(retention_days))
        .execute(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("trash entry".to_string()))
    }

    /// Get an entry by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<TrashEntry>> {
        let result = sqlx::query_as::<_, TrashEntry>(
            "SELECT id, link_id, deleted_at, expires_at, is_restored
             FROM trash_entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get the pending entry for a link, if any.
    pub async fn pending_for_link(&self, link_id: i64) -> Result<Option<TrashEntry>> {
        let result = sqlx::query_as::<_, TrashEntry>(
            "SELECT id, link_id, deleted_at, expires_at, is_restored
             FROM trash_entries WHERE link_id = ? AND is_restored = 0",
        )
        .bind(link_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// List an account's pending trash, most recently deleted first.
    pub async fn list_pending_for_account(&self, account_id: i64) -> Result<Vec<TrashedMail>> {
        let entries = sqlx::query_as::<_, TrashedMail>(
            "SELECT t.id AS entry_id, t.link_id, m.id AS message_id,
                    a.address AS sender_address, m.subject, t.deleted_at, t.expires_at
             FROM trash_entries t
             JOIN delivery_links l ON t.link_id = l.id
             JOIN messages m ON l.message_id = m.id
             JOIN accounts a ON m.sender_id = a.id
             WHERE l.recipient_id = ? AND t.is_restored = 0
             ORDER BY t.deleted_at DESC, t.id DESC",
        )
        .bind(account_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(entries)
    }

    /// List pending entries whose retention window is strictly past.
    pub async fn list_expired(&self) -> Result<Vec<TrashEntry>> {
        let entries = sqlx::query_as::<_, TrashEntry>(
            "SELECT id, link_id, deleted_at, expires_at, is_restored
             FROM trash_entries
             WHERE expires_at < datetime('now') AND is_restored = 0
             ORDER BY id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(entries)
    }

    /// Mark an entry restored. Returns false if it was not pending.
    pub async fn mark_restored(&self, entry_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE trash_entries SET is_restored = 1 WHERE id = ? AND is_restored = 0",
        )
        .bind(entry_id)
        .execute(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Physically delete an entry.
    pub async fn remove(&self, entry_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trash_entries WHERE id = ?")
            .bind(entry_id)
            .execute(self.pool)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
