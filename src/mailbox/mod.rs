//! Mailbox views and lifecycle for postbox.
//!
//! Everything an account sees of its mail: inbox and sent listings, detail
//! views that mark mail read, search, replies, and the move to trash.

mod service;
mod types;

pub use service::MailboxService;
pub use types::{MailDetail, ReceivedMail, RecipientStatus, SentMail};
