//! Trash types for postbox.

use chrono::{DateTime, Utc};

use crate::datetime;

/// A soft-deleted delivery link waiting for restore or expiry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrashEntry {
    pub id: i64,
    pub link_id: i64,
    pub deleted_at: String,
    /// End of the retention window, stamped when the entry is created.
    pub expires_at: String,
    /// Set on restore. The pending-entry unique index ignores restored
    /// rows, so the same link can be trashed again later.
    pub is_restored: bool,
}

impl TrashEntry {
    /// Whether the retention window has passed at `reference`.
    ///
    /// Strictly past: an entry expiring exactly at `reference` is kept.
    pub fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        datetime::is_past(&self.expires_at, reference)
    }
}

/// A trashed message as shown in the trash listing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrashedMail {
    pub entry_id: i64,
    pub link_id: i64,
    pub message_id: i64,
    pub sender_address: String,
    pub subject: String,
    pub deleted_at: String,
    pub expires_at: String,
}

impl TrashedMail {
    /// Deletion time formatted for display.
    pub fn formatted_deleted_at(&self) -> String {
        datetime::format_datetime_default(&self.deleted_at)
    }

    /// Expiry time formatted for display.
    pub fn formatted_expires_at(&self) -> String {
        datetime::format_datetime_default(&self.expires_at)
    }
}
