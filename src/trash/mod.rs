//! Trash handling for postbox.
//!
//! A deleted mail is a soft-deleted delivery link with a pending trash
//! entry. Within the retention window it can be restored or purged by its
//! owner; afterwards the expiry sweep removes it for good.

mod repository;
mod service;
mod types;

pub use repository::TrashRepository;
pub use service::{TrashService, DEFAULT_TRASH_RETENTION_DAYS};
pub use types::{TrashEntry, TrashedMail};
