//! Input validation for postbox account registration.
//!
//! This module provides validation functions for mail addresses and
//! nicknames. Password rules live in [`super::password`].

use thiserror::Error;

/// Minimum address length.
pub const MIN_ADDRESS_LENGTH: usize = 3;

/// Maximum address length.
pub const MAX_ADDRESS_LENGTH: usize = 254;

/// Maximum nickname length.
pub const MAX_NICKNAME_LENGTH: usize = 20;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address is too short.
    #[error("address must be at least {MIN_ADDRESS_LENGTH} characters")]
    AddressTooShort,

    /// Address is too long.
    #[error("address must be at most {MAX_ADDRESS_LENGTH} characters")]
    AddressTooLong,

    /// Address format is invalid.
    #[error("invalid address format")]
    AddressInvalidFormat,

    /// Nickname is empty.
    #[error("nickname cannot be empty")]
    NicknameEmpty,

    /// Nickname is too long.
    #[error("nickname must be at most {MAX_NICKNAME_LENGTH} characters")]
    NicknameTooLong,

    /// Nickname contains invalid characters.
    #[error("nickname contains invalid characters")]
    NicknameInvalidChars,
}

/// Validate a mail address.
///
/// Requirements:
/// - Length: 3-254 characters
/// - Exactly one `@` with a non-empty local part
/// - Domain with at least one dot and no empty labels
/// - No whitespace
///
/// This is intentionally simple; full RFC address grammar is out of scope.
///
/// # Examples
///
/// ```
/// use postbox::account::validate_address;
///
/// assert!(validate_address("user@example.com").is_ok());
/// assert!(validate_address("invalid").is_err());
/// assert!(validate_address("two@at@signs.com").is_err());
/// ```
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.len() < MIN_ADDRESS_LENGTH {
        return Err(ValidationError::AddressTooShort);
    }
    if address.len() > MAX_ADDRESS_LENGTH {
        return Err(ValidationError::AddressTooLong);
    }

    let parts: Vec<&str> = address.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::AddressInvalidFormat);
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::AddressInvalidFormat);
    }

    // Domain must contain at least one dot and no empty labels
    if !domain.contains('.') {
        return Err(ValidationError::AddressInvalidFormat);
    }
    if domain.split('.').any(|p| p.is_empty()) {
        return Err(ValidationError::AddressInvalidFormat);
    }

    if address.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::AddressInvalidFormat);
    }

    Ok(())
}

/// Validate a nickname.
///
/// Requirements:
/// - Not empty
/// - Length: at most 20 characters
/// - No control characters
///
/// # Examples
///
/// ```
/// use postbox::account::validate_nickname;
///
/// assert!(validate_nickname("John Doe").is_ok());
/// assert!(validate_nickname("").is_err()); // empty
/// ```
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.is_empty() {
        return Err(ValidationError::NicknameEmpty);
    }

    // Length in characters, not bytes
    if nickname.chars().count() > MAX_NICKNAME_LENGTH {
        return Err(ValidationError::NicknameTooLong);
    }

    if nickname.chars().any(|c| c.is_control()) {
        return Err(ValidationError::NicknameInvalidChars);
    }

    Ok(())
}
