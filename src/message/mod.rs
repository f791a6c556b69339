//! Message storage for postbox.
//!
//! A message is the immutable content of a send: sender, subject, and body.
//! Per-recipient state (read and delete flags) lives in the delivery module;
//! mailbox views join the two.

mod repository;
mod types;

pub use repository::MessageRepository;
pub use types::{DeliveryStatus, Message, NewMessage};
