//! Per-entity persistence traits for postbox.
//!
//! One trait per stored entity, implemented by the matching repository.
//! Orchestration logic that only needs lookups (recipient classification,
//! ownership checks) takes the trait, so tests can substitute in-memory
//! fakes; everything SQL-shaped stays in the repositories.

use crate::account::{Account, AccountRepository, AccountUpdate, NewAccount};
use crate::delivery::{DeliveryLink, LinkRepository};
use crate::message::{Message, MessageRepository, NewMessage};
use crate::trash::{TrashEntry, TrashRepository};
use crate::Result;

/// Account persistence.
#[allow(async_fn_in_trait)]
pub trait AccountStore {
    /// Create an account from prepared (validated, hashed) fields.
    async fn create(&self, new_account: &NewAccount) -> Result<Account>;

    /// Get an account by ID.
    async fn get_by_id(&self, id: i64) -> Result<Option<Account>>;

    /// Get an account by address (case-insensitive).
    async fn get_by_address(&self, address: &str) -> Result<Option<Account>>;

    /// Apply a partial update. Returns None if the account does not exist.
    async fn update(&self, id: i64, update: &AccountUpdate) -> Result<Option<Account>>;

    /// Check whether an address is taken (case-insensitive).
    async fn address_exists(&self, address: &str) -> Result<bool>;
}

/// Message persistence.
#[allow(async_fn_in_trait)]
pub trait MessageStore {
    /// Create a message.
    async fn create(&self, new_message: &NewMessage) -> Result<Message>;

    /// Get a message by ID.
    async fn get_by_id(&self, id: i64) -> Result<Option<Message>>;

    /// List an account's sent messages, newest first.
    async fn list_by_sender(&self, sender_id: i64) -> Result<Vec<Message>>;
}

/// Delivery link persistence.
#[allow(async_fn_in_trait)]
pub trait LinkStore {
    /// Create a link for one recipient of a message.
    async fn create(&self, message_id: i64, recipient_id: i64) -> Result<DeliveryLink>;

    /// Get a link by ID.
    async fn get_by_id(&self, id: i64) -> Result<Option<DeliveryLink>>;

    /// Get the link a recipient holds for a message, if any.
    async fn get_by_message_and_recipient(
        &self,
        message_id: i64,
        recipient_id: i64,
    ) -> Result<Option<DeliveryLink>>;

    /// Set the read flag. Returns false if it was already set.
    async fn mark_as_read(&self, link_id: i64) -> Result<bool>;

    /// Set the deleted flag. Returns false if it was already set.
    async fn mark_deleted(&self, link_id: i64) -> Result<bool>;

    /// Clear the deleted flag. Returns false if it was not set.
    async fn clear_deleted(&self, link_id: i64) -> Result<bool>;

    /// Count unread, non-deleted links for a recipient.
    async fn count_unread(&self, recipient_id: i64) -> Result<i64>;
}

/// Trash entry persistence.
#[allow(async_fn_in_trait)]
pub trait TrashStore {
    /// Create a pending entry for a link with the given retention window.
    async fn add(&self, link_id: i64, retention_days: u32) -> Result<TrashEntry>;

    /// Get the pending entry for a link, if any.
    async fn pending_for_link(&self, link_id: i64) -> Result<Option<TrashEntry>>;

    /// Mark an entry restored. Returns false if it was not pending.
    async fn mark_restored(&self, entry_id: i64) -> Result<bool>;

    /// Physically delete an entry.
    async fn remove(&self, entry_id: i64) -> Result<bool>;

    /// List pending entries whose retention window is strictly past.
    async fn list_expired(&self) -> Result<Vec<TrashEntry>>;
}

impl AccountStore for AccountRepository<'_> {
    async fn create(&self, new_account: &NewAccount) -> Result<Account> {
        AccountRepository::create(self, new_account).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        AccountRepository::get_by_id(self, id).await
    }

    async fn get_by_address(&self, address: &str) -> Result<Option<Account>> {
        AccountRepository::get_by_address(self, address).await
    }

    async fn update(&self, id: i64, update: &AccountUpdate) -> Result<Option<Account>> {
        AccountRepository::update(self, id, update).await
    }

    async fn address_exists(&self, address: &str) -> Result<bool> {
        AccountRepository::address_exists(self, address).await
    }
}

impl MessageStore for MessageRepository<'_> {
    async fn create(&self, new_message: &NewMessage) -> Result<Message> {
        MessageRepository::create(self, new_message).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Message>> {
        MessageRepository::get_by_id(self, id).await
    }

    async fn list_by_sender(&self, sender_id: i64) -> Result<Vec<Message>> {
        MessageRepository::list_by_sender(self, sender_id).await
    }
}

impl LinkStore for LinkRepository<'_> {
    async fn create(&self, message_id: i64, recipient_id: i64) -> Result<DeliveryLink> {
        LinkRepository::create(self, message_id, recipient_id).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<DeliveryLink>> {
        LinkRepository::get_by_id(self, id).await
    }

    async fn get_by_message_and_recipient(
        &self,
        message_id: i64,
        recipient_id: i64,
    ) -> Result<Option<DeliveryLink>> {
        LinkRepository::get_by_message_and_recipient(self, message_id, recipient_id).await
    }

    async fn mark_as_read(&self, link_id: i64) -> Result<bool> {
        LinkRepository::mark_as_read(self, link_id).await
    }

    async fn mark_deleted(&self, link_id: i64) -> Result<bool> {
        LinkRepository::mark_deleted(self, link_id).await
    }

    async fn clear_deleted(&self, link_id: i64) -> Result<bool> {
        LinkRepository::clear_deleted(self, link_id).await
    }

    async fn count_unread(&self, recipient_id: i64) -> Result<i64> {
        LinkRepository::count_unread(self, recipient_id).await
    }
}

impl TrashStore for TrashRepository<'_> {
    async fn add(&self, link_id: i64, retention_days: u32) -> Result<TrashEntry> {
        TrashRepository::add(self, link_id, retention_days).await
    }

    async fn pending_for_link(&self, link_id: i64) -> Result<Option<TrashEntry>> {
        TrashRepository::pending_for_link(self, link_id).await
    }

    async fn mark_restored(&self, entry_id: i64) -> Result<bool> {
        TrashRepository::mark_restored(self, entry_id).await
    }

    async fn remove(&self, entry_id: i64) -> Result<bool> {
        TrashRepository::remove(self, entry_id).await
    }

    async fn list_expired(&self) -> Result<Vec<TrashEntry>> {
        TrashRepository::list_expired(self).await
    }
}
