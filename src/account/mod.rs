//! Account module for postbox.
//!
//! The identity store: registration, authentication, profile management,
//! and account lifecycle. Recipient resolution for mail delivery goes
//! through this module's repository.

mod password;
mod repository;
mod service;
mod types;
mod validation;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use repository::AccountRepository;
pub use service::{AccountService, RegistrationRequest};
pub use types::{Account, AccountStatus, AccountUpdate, NewAccount};
pub use validation::{
    validate_address, validate_nickname, ValidationError, MAX_ADDRESS_LENGTH, MAX_NICKNAME_LENGTH,
    MIN_ADDRESS_LENGTH,
};
