//! Mailbox service for postbox.
//!
//! Received and sent views over delivery links, plus the operations that
//! change a recipient's copy: reading, moving to trash, replying. Every
//! query is scoped to the calling account; a non-recipient asking about a
//! message gets the same `NotFound` as for a message that does not exist.

use tracing::info;

use crate::account::AccountRepository;
use crate::config::MailConfig;
use crate::db::{escape_like, Database};
use crate::delivery::{DeliveryResult, DeliveryService, LinkRepository};
use crate::message::{Message, MessageRepository};
use crate::trash::DEFAULT_TRASH_RETENTION_DAYS;
use crate::{PostboxError, Result};

use super::types::{MailDetail, ReceivedMail, RecipientStatus, SentMail};

/// Service for one account's view of its mail.
pub struct MailboxService<'a> {
    db: &'a Database,
    retention_days: u32,
}

impl<'a> MailboxService<'a> {
    /// Create a new MailboxService with the default trash retention window.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            retention_days: DEFAULT_TRASH_RETENTION_DAYS,
        }
    }

    /// Create a MailboxService configured from mail settings.
    pub fn from_config(db: &'a Database, config: &MailConfig) -> Self {
        Self::new(db).with_retention_days(config.trash_retention_days)
    }

    /// Override the trash retention window.
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// List an account's received mail, newest first. Trashed mail is
    /// excluded.
    pub async fn list_received(&self, account_id: i64) -> Result<Vec<ReceivedMail>> {
        let mails = sqlx::query_as::<_, ReceivedMail>(
            "SELECT m.id AS message_id, a.address AS sender_address,
                    a.nickname AS sender_nickname, m.subject, l.is_read, m.created_at
             FROM delivery_links l
             JOIN messages m ON l.message_id = m.id
             JOIN accounts a ON m.sender_id = a.id
             WHERE l.recipient_id = ? AND l.is_deleted = 0
             ORDER BY m.created_at DESC, m.id DESC",
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(mails)
    }

    /// Open a received message, marking it read.
    ///
    /// The read flip is a compare-and-set, so a second viewing changes
    /// nothing. Requires a non-trashed link for the pair; anything else is
    /// `NotFound`.
    pub async fn view_detail(&self, message_id: i64, account_id: i64) -> Result<MailDetail> {
        let links = LinkRepository::new(self.db.pool());
        let link = links
            .get_by_message_and_recipient(message_id, account_id)
            .await?
            .filter(|l| !l.is_deleted)
            .ok_or_else(|| PostboxError::NotFound("message".to_string()))?;

        links.mark_as_read(link.id).await?;

        let detail = sqlx::query_as::<_, MailDetail>(
            "SELECT m.id AS message_id, a.address AS sender_address,
                    a.nickname AS sender_nickname, m.subject, m.body,
                    l.is_read, m.created_at
             FROM delivery_links l
             JOIN messages m ON l.message_id = m.id
             JOIN accounts a ON m.sender_id = a.id
             WHERE l.id = ?",
        )
        .bind(link.id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        detail.ok_or_else(|| PostboxError::NotFound("message".to_string()))
    }

    /// Search received mail by substring in subject or body.
    ///
    /// A blank keyword returns an empty list, never the whole inbox.
    pub async fn search_received(
        &self,
        keyword: &str,
        account_id: i64,
    ) -> Result<Vec<ReceivedMail>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(keyword));

        let mails = sqlx::query_as::<_, ReceivedMail>(
            "SELECT m.id AS message_id, a.address AS sender_address,
                    a.nickname AS sender_nickname, m.subject, l.is_read, m.created_at
             FROM delivery_links l
             JOIN messages m ON l.message_id = m.id
             JOIN accounts a ON m.sender_id = a.id
             WHERE l.recipient_id = ? AND l.is_deleted = 0
               AND (m.subject LIKE ? ESCAPE '\\' OR m.body LIKE ? ESCAPE '\\')
             ORDER BY m.created_at DESC, m.id DESC",
        )
        .bind(account_id)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(mails)
    }

    /// Move a received message to trash.
    ///
    /// The link's deleted flag and the trash entry are written in one
    /// transaction; the compare-and-set on the flag means concurrent deletes
    /// of the same copy produce exactly one trash entry and one `Conflict`.
    pub async fn delete_received(&self, message_id: i64, account_id: i64) -> Result<()> {
        let links = LinkRepository::new(self.db.pool());
        let link = links
            .get_by_message_and_recipient(message_id, account_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("message".to_string()))?;
        if link.is_deleted {
            return Err(PostboxError::Conflict(
                "message is already in trash".to_string(),
            ));
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        let flipped =
            sqlx::query("UPDATE delivery_links SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
                .bind(link.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;
        if flipped.rows_affected() == 0 {
            // Lost the race to a concurrent delete; the open transaction is
            // dropped and rolls back.
            return Err(PostboxError::Conflict(
                "message is already in trash".to_string(),
            ));
        }

        sqlx::query(
            "INSERT INTO trash_entries (link_id, expires_at)
             VALUES (?, datetime('now', '+' || ? || ' days'))",
        )
        .bind(link.id)
        .bind(i64::from(self.retention_days))
        .execute(&mut *tx)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        // Commit transaction
        tx.commit()
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        info!(
            "Moved message {} to trash for account {}",
            message_id, account_id
        );
        Ok(())
    }

    /// Count an account's unread mail.
    pub async fn count_unread(&self, account_id: i64) -> Result<i64> {
        let links = LinkRepository::new(self.db.pool());
        links.count_unread(account_id).await
    }

    /// List an account's sent mail with per-message delivery counts,
    /// newest first.
    pub async fn list_sent(&self, account_id: i64) -> Result<Vec<SentMail>> {
        let mails = sqlx::query_as::<_, SentMail>(
            "SELECT m.id AS message_id, m.subject,
                    COUNT(l.id) AS recipient_count,
                    COALESCE(SUM(l.is_read), 0) AS read_count,
                    m.created_at
             FROM messages m
             LEFT JOIN delivery_links l ON l.message_id = m.id
             WHERE m.sender_id = ?
             GROUP BY m.id
             ORDER BY m.created_at DESC, m.id DESC",
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(mails)
    }

    /// Show a sent message with each recipient's read state.
    ///
    /// Sender only; everyone else gets `NotFound`.
    pub async fn sent_detail(
        &self,
        message_id: i64,
        account_id: i64,
    ) -> Result<(Message, Vec<RecipientStatus>)> {
        let messages = MessageRepository::new(self.db.pool());
        let message = messages
            .get_by_id(message_id)
            .await?
            .filter(|m| m.sender_id == account_id)
            .ok_or_else(|| PostboxError::NotFound("message".to_string()))?;

        let recipients = sqlx::query_as::<_, RecipientStatus>(
            "SELECT a.address, a.nickname, l.is_read
             FROM delivery_links l
             JOIN accounts a ON l.recipient_id = a.id
             WHERE l.message_id = ?
             ORDER BY l.id",
        )
        .bind(message_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok((message, recipients))
    }

    /// Search sent mail by substring in subject or body.
    ///
    /// A blank keyword returns an empty list.
    pub async fn search_sent(&self, keyword: &str, account_id: i64) -> Result<Vec<SentMail>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(keyword));

        let mails = sqlx::query_as::<_, SentMail>(
            "SELECT m.id AS message_id, m.subject,
                    COUNT(l.id) AS recipient_count,
                    COALESCE(SUM(l.is_read), 0) AS read_count,
                    m.created_at
             FROM messages m
             LEFT JOIN delivery_links l ON l.message_id = m.id
             WHERE m.sender_id = ?
               AND (m.subject LIKE ? ESCAPE '\\' OR m.body LIKE ? ESCAPE '\\')
             GROUP BY m.id
             ORDER BY m.created_at DESC, m.id DESC",
        )
        .bind(account_id)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(mails)
    }

    /// Reply to a received message.
    ///
    /// The replier must hold a link for the original, trashed or not. The
    /// reply goes to the original sender through the normal delivery path,
    /// with the subject prefixed `"Re: "` unless it already is.
    pub async fn reply(
        &self,
        original_message_id: i64,
        replier_id: i64,
        body: &str,
    ) -> Result<DeliveryResult> {
        let messages = MessageRepository::new(self.db.pool());
        let original = messages
            .get_by_id(original_message_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("message".to_string()))?;

        let links = LinkRepository::new(self.db.pool());
        links
            .get_by_message_and_recipient(original_message_id, replier_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("message".to_string()))?;

        let accounts = AccountRepository::new(self.db.pool());
        let original_sender = accounts
            .get_by_id(original.sender_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("sender account".to_string()))?;

        let subject = if original.subject.starts_with("Re:") {
            original.subject.clone()
        } else {
            format!("Re: {}", original.subject)
        };

        let delivery = DeliveryService::new(self.db);
        delivery
            .send(replier_id, &[original_sender.address], &subject, body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountRepository, NewAccount};
    use crate::trash::TrashRepository;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn create_account(db: &Database, address: &str, nickname: &str) -> i64 {
        let repo = AccountRepository::new(db.pool());
        repo.create(&NewAccount::new(address, "hash", nickname))
            .await
            .unwrap()
            .id
    }

    async fn send(
        db: &Database,
        sender_id: i64,
        recipients: &[&str],
        subject: &str,
        body: &str,
    ) -> i64 {
        let list: Vec<String> = recipients.iter().map(|s| s.to_string()).collect();
        DeliveryService::new(db)
            .send(sender_id, &list, subject, body)
            .await
            .unwrap()
            .message_id
    }

    #[tokio::test]
    async fn test_list_received_newest_first() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        send(&db, alice, &["bob@example.com"], "First", "Body").await;
        send(&db, alice, &["bob@example.com"], "Second", "Body").await;

        let inbox = MailboxService::new(&db).list_received(bob).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].subject, "Second");
        assert_eq!(inbox[1].subject, "First");
        assert_eq!(inbox[0].sender_address, "alice@example.com");
        assert_eq!(inbox[0].sender_nickname, "Alice");
        assert!(!inbox[0].is_read);
    }

    #[tokio::test]
    async fn test_list_received_excludes_trashed() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let kept = send(&db, alice, &["bob@example.com"], "Keep", "Body").await;
        let trashed = send(&db, alice, &["bob@example.com"], "Trash", "Body").await;

        let service = MailboxService::new(&db);
        service.delete_received(trashed, bob).await.unwrap();

        let inbox = service.list_received(bob).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message_id, kept);
    }

    #[tokio::test]
    async fn test_view_detail_marks_read_once() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Hello", "Body text").await;

        let service = MailboxService::new(&db);
        assert_eq!(service.count_unread(bob).await.unwrap(), 1);

        let detail = service.view_detail(message_id, bob).await.unwrap();
        assert_eq!(detail.subject, "Hello");
        assert_eq!(detail.body, "Body text");
        assert!(detail.is_read);
        assert_eq!(service.count_unread(bob).await.unwrap(), 0);

        // Second viewing is a no-op
        let again = service.view_detail(message_id, bob).await.unwrap();
        assert!(again.is_read);
        assert_eq!(service.count_unread(bob).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_view_detail_is_recipient_only() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let carol = create_account(&db, "carol@example.com", "Carol").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Private", "Body").await;

        let service = MailboxService::new(&db);

        // Non-recipient and nonexistent message produce the same error
        let foreign = service.view_detail(message_id, carol).await.unwrap_err();
        let missing = service.view_detail(9999, bob).await.unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn test_view_detail_rejects_trashed() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Gone", "Body").await;

        let service = MailboxService::new(&db);
        service.delete_received(message_id, bob).await.unwrap();

        let err = service.view_detail(message_id, bob).await.unwrap_err();
        assert!(matches!(err, PostboxError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_received() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        send(&db, alice, &["bob@example.com"], "Lunch plans", "At noon?").await;
        send(&db, alice, &["bob@example.com"], "Status", "lunch moved").await;
        send(&db, alice, &["bob@example.com"], "Other", "Nothing").await;

        let service = MailboxService::new(&db);

        let hits = service.search_received("lunch", bob).await.unwrap();
        assert_eq!(hits.len(), 2);

        // Blank keyword never returns the whole inbox
        assert!(service.search_received("   ", bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_received_creates_trash_entry() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Bye", "Body").await;

        let service = MailboxService::new(&db).with_retention_days(7);
        service.delete_received(message_id, bob).await.unwrap();

        let links = LinkRepository::new(db.pool());
        let link = links
            .get_by_message_and_recipient(message_id, bob)
            .await
            .unwrap()
            .unwrap();
        assert!(link.is_deleted);

        let entry = TrashRepository::new(db.pool())
            .pending_for_link(link.id)
            .await
            .unwrap()
            .unwrap();
        let deleted = crate::datetime::parse_datetime(&entry.deleted_at).unwrap();
        let expires = crate::datetime::parse_datetime(&entry.expires_at).unwrap();
        assert_eq!((expires - deleted).num_days(), 7);
    }

    #[tokio::test]
    async fn test_delete_received_twice_conflicts() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Bye", "Body").await;

        let service = MailboxService::new(&db);
        service.delete_received(message_id, bob).await.unwrap();

        let err = service.delete_received(message_id, bob).await.unwrap_err();
        assert!(matches!(err, PostboxError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_received_is_recipient_only() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Bye", "Body").await;

        // The sender holds no link and cannot trash the recipient's copy
        let err = MailboxService::new(&db)
            .delete_received(message_id, alice)
            .await
            .unwrap_err();
        assert!(matches!(err, PostboxError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_sent_with_read_counts() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        create_account(&db, "carol@example.com", "Carol").await;
        let message_id = send(
            &db,
            alice,
            &["bob@example.com", "carol@example.com"],
            "Team note",
            "Body",
        )
        .await;

        let service = MailboxService::new(&db);
        service.view_detail(message_id, bob).await.unwrap();

        let sent = service.list_sent(alice).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient_count, 2);
        assert_eq!(sent[0].read_count, 1);
    }

    #[tokio::test]
    async fn test_sent_detail_per_recipient() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        create_account(&db, "carol@example.com", "Carol").await;
        let message_id = send(
            &db,
            alice,
            &["bob@example.com", "carol@example.com"],
            "Team note",
            "Body",
        )
        .await;

        let service = MailboxService::new(&db);
        service.view_detail(message_id, bob).await.unwrap();

        let (message, recipients) = service.sent_detail(message_id, alice).await.unwrap();
        assert_eq!(message.subject, "Team note");
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].address, "bob@example.com");
        assert!(recipients[0].is_read);
        assert_eq!(recipients[1].address, "carol@example.com");
        assert!(!recipients[1].is_read);
    }

    #[tokio::test]
    async fn test_sent_detail_is_sender_only() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Note", "Body").await;

        let err = MailboxService::new(&db)
            .sent_detail(message_id, bob)
            .await
            .unwrap_err();
        assert!(matches!(err, PostboxError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_sent() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        create_account(&db, "bob@example.com", "Bob").await;
        send(&db, alice, &["bob@example.com"], "Invoice March", "Attached").await;
        send(&db, alice, &["bob@example.com"], "Hello", "About the invoice").await;

        let service = MailboxService::new(&db);
        let hits = service.search_sent("invoice", alice).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(service.search_sent("", alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reply_prefixes_subject_and_delivers_to_sender() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Question", "Free today?").await;

        let service = MailboxService::new(&db);
        let result = service.reply(message_id, bob, "Yes, after 3pm").await.unwrap();
        assert_eq!(result.delivered_count, 1);

        let alice_inbox = service.list_received(alice).await.unwrap();
        assert_eq!(alice_inbox.len(), 1);
        assert_eq!(alice_inbox[0].subject, "Re: Question");
        assert_eq!(alice_inbox[0].sender_address, "bob@example.com");
    }

    #[tokio::test]
    async fn test_reply_does_not_double_prefix() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let first = send(&db, alice, &["bob@example.com"], "Question", "Free today?").await;

        let service = MailboxService::new(&db);
        service.reply(first, bob, "Yes").await.unwrap();

        // Alice replies to Bob's "Re: Question"
        let re = service.list_received(alice).await.unwrap()[0].message_id;
        service.reply(re, alice, "Great").await.unwrap();

        let bob_inbox = service.list_received(bob).await.unwrap();
        assert_eq!(bob_inbox[0].subject, "Re: Question");
    }

    #[tokio::test]
    async fn test_reply_requires_a_link() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let carol = create_account(&db, "carol@example.com", "Carol").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Private", "Body").await;

        let err = MailboxService::new(&db)
            .reply(message_id, carol, "Let me in")
            .await
            .unwrap_err();
        assert!(matches!(err, PostboxError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reply_allowed_from_trash() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Old thread", "Body").await;

        let service = MailboxService::new(&db);
        service.delete_received(message_id, bob).await.unwrap();

        let result = service.reply(message_id, bob, "Digging this up").await.unwrap();
        assert_eq!(result.delivered_count, 1);
    }

    #[tokio::test]
    async fn test_from_config_retention() {
        let db = setup_db().await;
        let alice = create_account(&db, "alice@example.com", "Alice").await;
        let bob = create_account(&db, "bob@example.com", "Bob").await;
        let message_id = send(&db, alice, &["bob@example.com"], "Bye", "Body").await;

        let config = MailConfig {
            trash_retention_days: 3,
            ..MailConfig::default()
        };
        let service = MailboxService::from_config(&db, &config);
        service.delete_received(message_id, bob).await.unwrap();

        let link = LinkRepository::new(db.pool())
            .get_by_message_and_recipient(message_id, bob)
            .await
            .unwrap()
            .unwrap();
        let entry = TrashRepository::new(db.pool())
            .pending_for_link(link.id)
            .await
            .unwrap()
            .unwrap();
        let deleted = crate::datetime::parse_datetime(&entry.deleted_at).unwrap();
        let expires = crate::datetime::parse_datetime(&entry.expires_at).unwrap();
        assert_eq!((expires - deleted).num_days(), 3);
    }
}
