//! Account model for postbox.
//!
//! This module defines the Account struct and AccountStatus enum for the
//! identity store.

use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountStatus {
    /// Account can send and receive mail.
    #[default]
    Active,
    /// Account is closed; it cannot log in, send, or receive new mail.
    Deactivated,
}

impl AccountStatus {
    /// Convert status to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Deactivated => "deactivated",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "deactivated" => Ok(AccountStatus::Deactivated),
            _ => Err(format!("unknown account status: {s}")),
        }
    }
}

// Lets sqlx decode the TEXT status column through the FromRow derive.
impl TryFrom<String> for AccountStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Account entity representing a registered mail user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID.
    pub id: i64,
    /// Mail address (unique, case-insensitive). Immutable after creation.
    pub address: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Display name shown to other users.
    pub nickname: String,
    /// Lifecycle status.
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last profile update timestamp.
    pub updated_at: String,
    /// When the account was deactivated (None while active).
    pub deactivated_at: Option<String>,
}

impl Account {
    /// Check whether this account may send and receive mail.
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Mail address.
    pub address: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Display name.
    pub nickname: String,
}

impl NewAccount {
    /// Create account data with the required fields.
    pub fn new(
        address: impl Into<String>,
        password: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
            nickname: nickname.into(),
        }
    }
}

/// Data for updating an existing account.
///
/// Only fields that are set will be modified. The address is deliberately
/// absent; addresses never change after creation.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    /// New password hash (if changing password).
    pub password: Option<String>,
    /// New nickname.
    pub nickname: Option<String>,
    /// New lifecycle status.
    pub status: Option<AccountStatus>,
}

impl AccountUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new password hash.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set new nickname.
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Set new status.
    pub fn status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.nickname.is_none() && self.status.is_none()
    }
}
