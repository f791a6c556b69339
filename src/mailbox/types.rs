//! Mailbox view types for postbox.
//!
//! Joined rows as the mailbox presents them: message content plus the
//! caller's own link state, never another recipient's.

use crate::datetime;

/// An inbox row: a received message with the caller's read flag.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReceivedMail {
    /// Message ID.
    pub message_id: i64,
    /// Sender's address.
    pub sender_address: String,
    /// Sender's display name.
    pub sender_nickname: String,
    /// Mail subject.
    pub subject: String,
    /// Whether the caller has read the mail.
    pub is_read: bool,
    /// When the mail was sent.
    pub created_at: String,
}

impl ReceivedMail {
    /// Sent time formatted for display.
    pub fn formatted_date(&self) -> String {
        datetime::format_datetime_default(&self.created_at)
    }
}

/// A received message opened for reading.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MailDetail {
    /// Message ID.
    pub message_id: i64,
    /// Sender's address.
    pub sender_address: String,
    /// Sender's display name.
    pub sender_nickname: String,
    /// Mail subject.
    pub subject: String,
    /// Mail body.
    pub body: String,
    /// Whether the caller has read the mail. Always true after viewing.
    pub is_read: bool,
    /// When the mail was sent.
    pub created_at: String,
}

impl MailDetail {
    /// Sent time formatted for display.
    pub fn formatted_date(&self) -> String {
        datetime::format_datetime_default(&self.created_at)
    }
}

/// A sent-box row: one of the caller's messages with delivery counts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SentMail {
    /// Message ID.
    pub message_id: i64,
    /// Mail subject.
    pub subject: String,
    /// Number of recipients the mail was delivered to.
    pub recipient_count: i64,
    /// Number of recipients who have read it.
    pub read_count: i64,
    /// When the mail was sent.
    pub created_at: String,
}

impl SentMail {
    /// Sent time formatted for display.
    pub fn formatted_date(&self) -> String {
        datetime::format_datetime_default(&self.created_at)
    }
}

/// One recipient's read state, as shown to the sender.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipientStatus {
    /// Recipient's address.
    pub address: String,
    /// Recipient's display name.
    pub nickname: String,
    /// Whether this recipient has read the mail.
    pub is_read: bool,
}
