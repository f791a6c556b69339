//! Delivery types for postbox.

use serde::Deserialize;

/// How a send treats unknown or deactivated recipient addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SendPolicy {
    /// Reject the whole send if any recipient is invalid.
    #[default]
    Strict,
    /// Drop invalid recipients and deliver to the rest.
    SkipInvalid,
}

impl SendPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendPolicy::Strict => "strict",
            SendPolicy::SkipInvalid => "skip-invalid",
        }
    }
}

impl std::fmt::Display for SendPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recipient's copy of a message.
///
/// The link carries all per-recipient state; the message row itself is never
/// touched after the send. A unique (message_id, recipient_id) pair means a
/// recipient holds at most one link per message.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeliveryLink {
    pub id: i64,
    pub message_id: i64,
    pub recipient_id: i64,
    /// Set once when the recipient first opens the message.
    pub is_read: bool,
    /// Set while the link sits in trash; cleared on restore.
    pub is_deleted: bool,
}

/// Outcome of a completed send.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub message_id: i64,
    /// Number of links created.
    pub delivered_count: usize,
    /// Addresses dropped under [`SendPolicy::SkipInvalid`]; always empty
    /// under [`SendPolicy::Strict`].
    pub skipped: Vec<String>,
}

impl DeliveryResult {
    /// One-line summary for logs and confirmation screens.
    pub fn summary(&self) -> String {
        if self.skipped.is_empty() {
            format!("delivered to {} recipient(s)", self.delivered_count)
        } else {
            format!(
                "delivered to {} recipient(s), skipped {}: {}",
                self.delivered_count,
                self.skipped.len(),
                self.skipped.join(", ")
            )
        }
    }
}
