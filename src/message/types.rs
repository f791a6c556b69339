//! Message model for postbox.
//!
//! A message is the canonical copy of a piece of mail: one row per send,
//! immutable once written. Per-recipient state lives on the delivery links,
//! never here.

use std::fmt;
use std::str::FromStr;

/// Outcome recorded for a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryStatus {
    /// The send committed and links exist for every recipient.
    #[default]
    Sent,
    /// The send failed after the message row was written.
    ///
    /// Normal failures roll the whole transaction back, so this state is
    /// only reachable through manual intervention.
    Failed,
}

impl DeliveryStatus {
    /// Convert status to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sent" => Ok(DeliveryStatus::Sent),
            "failed" => Ok(DeliveryStatus::Failed),
            _ => Err(format!("unknown delivery status: {s}")),
        }
    }
}

impl TryFrom<String> for DeliveryStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Message entity: the single durable copy of a sent mail.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    /// Message ID.
    pub id: i64,
    /// Sending account ID.
    pub sender_id: i64,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Send outcome.
    #[sqlx(try_from = "String")]
    pub status: DeliveryStatus,
    /// When the message was created.
    pub created_at: String,
}

/// Data for creating a new message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Sending account ID.
    pub sender_id: i64,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
}

impl NewMessage {
    /// Create message data with the required fields.
    pub fn new(sender_id: i64, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender_id,
            subject: subject.into(),
            body: body.into(),
        }
    }
}
