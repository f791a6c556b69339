//! Trash lifecycle for postbox.
//!
//! Trashed mail stays restorable until its retention window passes; the
//! sweep then removes the entry and its link for good. Restore and purge
//! are owner-only and compare-and-set, so racing calls on the same entry
//! resolve to one winner.

use sqlx::QueryBuilder;
use tracing::info;

use crate::db::Database;
use crate::delivery::LinkRepository;
use crate::{PostboxError, Result};

use super::repository::TrashRepository;
use super::types::{TrashEntry, TrashedMail};

/// Default days a trashed mail stays restorable.
pub const DEFAULT_TRASH_RETENTION_DAYS: u32 = 30;

/// Service for trash listing, restore, purge, and expiry.
pub struct TrashService<'a> {
    db: &'a Database,
}

impl<'a> TrashService<'a> {
    /// Create a new TrashService with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List an account's trashed mail, most recently deleted first.
    pub async fn list_trash(&self, account_id: i64) -> Result<Vec<TrashedMail>> {
        let trash = TrashRepository::new(self.db.pool());
        trash.list_pending_for_account(account_id).await
    }

    /// Fetch an entry and verify the caller owns its link.
    ///
    /// A foreign or missing entry is the same `NotFound`; ownership is
    /// never revealed.
    async fn get_owned(&self, entry_id: i64, account_id: i64) -> Result<TrashEntry> {
        let trash = TrashRepository::new(self.db.pool());
        let entry = trash
            .get_by_id(entry_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("trash entry".to_string()))?;

        let links = LinkRepository::new(self.db.pool());
        let link = links
            .get_by_id(entry.link_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("trash entry".to_string()))?;
        if link.recipient_id != account_id {
            return Err(PostboxError::NotFound("trash entry".to_string()));
        }

        Ok(entry)
    }

    /// Restore a trashed message to the inbox.
    ///
    /// Marks the entry restored and clears the link's deleted flag in one
    /// transaction. The read flag is untouched. Restoring an already
    /// restored entry is a `Conflict`.
    pub async fn restore(&self, trash_entry_id: i64, account_id: i64) -> Result<()> {
        let entry = self.get_owned(trash_entry_id, account_id).await?;
        if entry.is_restored {
            return Err(PostboxError::Conflict(
                "entry is already restored".to_string(),
            ));
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        let flipped = sqlx::query(
            "UPDATE trash_entries SET is_restored = 1 WHERE id = ? AND is_restored = 0",
        )
        .bind(entry.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;
        if flipped.rows_affected() == 0 {
            // Lost the race; the open transaction rolls back on drop
            return Err(PostboxError::Conflict(
                "entry is already restored".to_string(),
            ));
        }

        sqlx::query("UPDATE delivery_links SET is_deleted = 0 WHERE id = ?")
            .bind(entry.link_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        // Commit transaction
        tx.commit()
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        info!(
            "Restored trash entry {} for account {}",
            entry.id, account_id
        );
        Ok(())
    }

    /// Remove a trashed message for good.
    ///
    /// Deletes the entry and its link in one transaction; the message row
    /// itself stays for the sender's sent view. Pending entries only; a
    /// restored entry is a `Conflict`.
    pub async fn permanently_delete(&self, trash_entry_id: i64, account_id: i64) -> Result<()> {
        let entry = self.get_owned(trash_entry_id, account_id).await?;
        if entry.is_restored {
            return Err(PostboxError::Conflict(
                "entry is already restored".to_string(),
            ));
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        let removed = sqlx::query("DELETE FROM trash_entries WHERE id = ? AND is_restored = 0")
            .bind(entry.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;
        if removed.rows_affected() == 0 {
            return Err(PostboxError::Conflict(
                "entry is already restored".to_string(),
            ));
        }

        sqlx::query("DELETE FROM delivery_links WHERE id = ?")
            .bind(entry.link_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        // Commit transaction
        tx.commit()
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        info!("Purged trash entry {} for account {}", entry.id, account_id);
        Ok(())
    }

    /// Remove every pending entry whose retention window is strictly past,
    /// along with its link. Returns the number removed.
    ///
    /// Meant to be called from an external scheduler.
    pub async fn expire_old_entries(&self) -> Result<u64> {
        // Start transaction
        let mut tx = self.db.begin().await?;

        // Pin the expired set once; the deletes below reuse these ids so an
        // entry crossing the boundary mid-sweep waits for the next run.
        let expired: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT id, link_id FROM trash_entries
             WHERE expires_at < datetime('now') AND is_restored = 0",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        if expired.is_empty() {
            return Ok(0);
        }

        let mut delete_entries: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("DELETE FROM trash_entries WHERE id IN (");
        let mut separated = delete_entries.separated(", ");
        for (entry_id, _) in &expired {
            separated.push_bind(*entry_id);
        }
        separated.push_unseparated(")");
        delete_entries
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        let mut delete_links: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("DELETE FROM delivery_links WHERE id IN (");
        let mut separated = delete_links.separated(", ");
        for (_, link_id) in &expired {
            separated.push_bind(*link_id);
        }
        separated.push_unseparated(")");
        delete_links
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        // Commit transaction
        tx.commit()
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        info!("Expired {} trashed message(s)", expired.len());
        Ok(expired.len() as u64)
    }
}
