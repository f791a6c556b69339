//! postbox - personal mail delivery and mailbox core.
//!
//! Multi-recipient sends fan out atomically to per-recipient delivery
//! links; each recipient owns their copy's read and trash state, so one
//! recipient deleting a mail never touches another's. Trashed mail stays
//! restorable for a retention window, then the expiry sweep removes it.

pub mod account;
pub mod config;
pub mod datetime;
pub mod db;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod message;
pub mod store;
pub mod trash;

pub use account::{
    hash_password, validate_address, validate_nickname, validate_password, verify_password,
    Account, AccountRepository, AccountService, AccountStatus, AccountUpdate, NewAccount,
    PasswordError, RegistrationRequest, ValidationError,
};
pub use config::Config;
pub use db::Database;
pub use delivery::{
    classify_recipients, DeliveryLink, DeliveryResult, DeliveryService, LinkRepository, SendPolicy,
};
pub use error::{PostboxError, Result};
pub use mailbox::{MailDetail, MailboxService, ReceivedMail, RecipientStatus, SentMail};
pub use message::{DeliveryStatus, Message, MessageRepository, NewMessage};
pub use store::{AccountStore, LinkStore, MessageStore, TrashStore};
pub use trash::{
    TrashEntry, TrashRepository, TrashService, TrashedMail, DEFAULT_TRASH_RETENTION_DAYS,
};
