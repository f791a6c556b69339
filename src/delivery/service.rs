//! Delivery orchestration for postbox.
//!
//! Sending is all-or-nothing: recipients are resolved and classified before
//! the transaction opens, then the message row and every delivery link are
//! written in one transaction. No partial fan-out is ever visible.

use std::collections::HashSet;

use tracing::info;

use crate::account::{Account, AccountRepository};
use crate::config::MailConfig;
use crate::db::Database;
use crate::store::AccountStore;
use crate::{PostboxError, Result};

use super::types::{DeliveryResult, SendPolicy};

/// Default maximum subject length (in characters).
pub const DEFAULT_MAX_SUBJECT_LENGTH: usize = 100;

/// Default maximum body length (in characters).
pub const DEFAULT_MAX_BODY_LENGTH: usize = 10_000;

/// Validate a subject string.
fn validate_subject(subject: &str, max_length: usize) -> Result<()> {
    let char_count = subject.chars().count();
    if char_count > max_length {
        return Err(PostboxError::Validation(format!(
            "subject is too long ({} characters max)",
            max_length
        )));
    }
    if subject.trim().is_empty() {
        return Err(PostboxError::Validation(
            "subject must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate a body string.
fn validate_body(body: &str, max_length: usize) -> Result<()> {
    let char_count = body.chars().count();
    if char_count > max_length {
        return Err(PostboxError::Validation(format!(
            "body is too long ({} characters max)",
            max_length
        )));
    }
    if body.trim().is_empty() {
        return Err(PostboxError::Validation(
            "body must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Split raw recipient addresses into resolved active accounts and invalid
/// entries.
///
/// Addresses are trimmed and deduplicated case-insensitively; the first
/// spelling wins. Unknown and deactivated addresses are invalid.
pub async fn classify_recipients<S: AccountStore>(
    store: &S,
    addresses: &[String],
) -> Result<(Vec<Account>, Vec<String>)> {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for address in addresses {
        let trimmed = address.trim();
        if !seen.insert(trimmed.to_lowercase()) {
            continue;
        }
        match store.get_by_address(trimmed).await? {
            Some(account) if account.is_active() => valid.push(account),
            _ => invalid.push(trimmed.to_string()),
        }
    }

    Ok((valid, invalid))
}

/// Service for sending messages to one or more recipients.
pub struct DeliveryService<'a> {
    db: &'a Database,
    policy: SendPolicy,
    max_subject_length: usize,
    max_body_length: usize,
}

impl<'a> DeliveryService<'a> {
    /// Create a new DeliveryService with the strict policy and default limits.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            policy: SendPolicy::default(),
            max_subject_length: DEFAULT_MAX_SUBJECT_LENGTH,
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
        }
    }

    /// Create a DeliveryService configured from mail settings.
    pub fn from_config(db: &'a Database, config: &MailConfig) -> Self {
        Self::new(db)
            .with_policy(config.send_policy)
            .with_limits(config.max_subject_length, config.max_body_length)
    }

    /// Override the send policy.
    pub fn with_policy(mut self, policy: SendPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the subject and body length limits.
    pub fn with_limits(mut self, max_subject_length: usize, max_body_length: usize) -> Self {
        self.max_subject_length = max_subject_length;
        self.max_body_length = max_body_length;
        self
    }

    /// Send a message from `sender_id` to the given recipient addresses.
    ///
    /// Under [`SendPolicy::Strict`] any invalid recipient rejects the whole
    /// send; under [`SendPolicy::SkipInvalid`] invalid recipients are dropped
    /// and reported in the result. A send with no valid recipient always
    /// fails, and a failed send leaves no rows behind.
    pub async fn send(
        &self,
        sender_id: i64,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<DeliveryResult> {
        validate_subject(subject, self.max_subject_length)?;
        validate_body(body, self.max_body_length)?;
        if recipients.is_empty() {
            return Err(PostboxError::Validation(
                "at least one recipient is required".to_string(),
            ));
        }

        let accounts = AccountRepository::new(self.db.pool());
        let sender = accounts
            .get_by_id(sender_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("sender account".to_string()))?;
        if !sender.is_active() {
            return Err(PostboxError::Validation(
                "sender account is deactivated".to_string(),
            ));
        }

        let (valid, invalid) = classify_recipients(&accounts, recipients).await?;
        if !invalid.is_empty() && self.policy == SendPolicy::Strict {
            return Err(PostboxError::InvalidRecipients(invalid));
        }
        if valid.is_empty() {
            return Err(PostboxError::InvalidRecipients(invalid));
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        let message_id: i64 = sqlx::query_scalar(
            "INSERT INTO messages (sender_id, subject, body) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(sender_id)
        .bind(subject)
        .bind(body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        for recipient in &valid {
            sqlx::query("INSERT INTO delivery_links (message_id, recipient_id) VALUES (?, ?)")
                .bind(message_id)
                .bind(recipient.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;
        }

        // Commit transaction
        tx.commit()
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        info!(
            "Delivered message {} from {} to {} recipient(s)",
            message_id,
            sender.address,
            valid.len()
        );

        Ok(DeliveryResult {
            message_id,
            delivered_count: valid.len(),
            skipped: invalid,
        })
    }
}
