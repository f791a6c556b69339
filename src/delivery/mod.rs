//! Message delivery for postbox.
//!
//! Sending a message fans out to one delivery link per recipient inside a
//! single transaction. The policy decides whether invalid recipients reject
//! the send or get skipped; either way no partial delivery is ever written.

mod repository;
mod service;
mod types;

pub use repository::LinkRepository;
pub use service::{
    classify_recipients, DeliveryService, DEFAULT_MAX_BODY_LENGTH, DEFAULT_MAX_SUBJECT_LENGTH,
};
pub use types::{DeliveryLink, DeliveryResult, SendPolicy};
