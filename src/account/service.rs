//! Account service for postbox.
//!
//! High-level identity operations: registration, login, profile updates,
//! password changes, and deactivation. All credential material is hashed
//! at this boundary; repositories only ever see Argon2 hashes.

use tracing::info;

use crate::db::Database;
use crate::{PostboxError, Result};

use super::password::{hash_password, verify_password, PasswordError};
use super::repository::AccountRepository;
use super::types::{Account, AccountStatus, AccountUpdate, NewAccount};
use super::validation::{validate_address, validate_nickname, ValidationError};

impl From<ValidationError> for PostboxError {
    fn from(e: ValidationError) -> Self {
        PostboxError::Validation(e.to_string())
    }
}

impl From<PasswordError> for PostboxError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort | PasswordError::TooLong => {
                PostboxError::Validation(e.to_string())
            }
            _ => PostboxError::Auth(e.to_string()),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Mail address (unique, 3-254 characters).
    pub address: String,
    /// Password (8-128 characters).
    pub password: String,
    /// Display nickname (1-20 characters).
    pub nickname: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
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

/// Service for account operations.
pub struct AccountService<'a> {
    db: &'a Database,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Register a new account.
    ///
    /// Validates all fields, rejects duplicate addresses, hashes the
    /// password, and creates the account.
    pub async fn register(&self, request: RegistrationRequest) -> Result<Account> {
        validate_address(&request.address)?;
        validate_nickname(&request.nickname)?;

        let repo = AccountRepository::new(self.db.pool());
        if repo.address_exists(&request.address).await? {
            return Err(PostboxError::Conflict(
                "address is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        let account = repo
            .create(&NewAccount::new(
                &request.address,
                &password_hash,
                &request.nickname,
            ))
            .await?;

        info!("Registered account: {}", account.address);
        Ok(account)
    }

    /// Authenticate an account by address and password.
    ///
    /// Unknown addresses, deactivated accounts, and wrong passwords all
    /// produce the same error, so callers learn nothing about which
    /// addresses exist.
    pub async fn login(&self, address: &str, password: &str) -> Result<Account> {
        let invalid = || PostboxError::Auth("invalid address or password".to_string());

        let repo = AccountRepository::new(self.db.pool());
        let account = repo.get_by_address(address).await?.ok_or_else(invalid)?;

        if !account.is_active() {
            return Err(invalid());
        }

        verify_password(password, &account.password).map_err(|_| invalid())?;

        Ok(account)
    }

    /// Change an account's password after verifying the current one.
    pub async fn change_password(
        &self,
        account_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let repo = AccountRepository::new(self.db.pool());
        let account = repo
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("account".to_string()))?;

        verify_password(current_password, &account.password)
            .map_err(|_| PostboxError::Auth("current password is incorrect".to_string()))?;

        let new_hash = hash_password(new_password)?;

        repo.update(account_id, &AccountUpdate::new().password(new_hash))
            .await?;

        info!("Password changed for account {}", account_id);
        Ok(())
    }

    /// Update an account's profile.
    ///
    /// The current password must verify before anything changes. The
    /// nickname and the password can be changed independently or together;
    /// the address is immutable.
    pub async fn update_profile(
        &self,
        account_id: i64,
        current_password: &str,
        nickname: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<Account> {
        let repo = AccountRepository::new(self.db.pool());
        let account = repo
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("account".to_string()))?;

        verify_password(current_password, &account.password)
            .map_err(|_| PostboxError::Auth("current password is incorrect".to_string()))?;

        let mut update = AccountUpdate::new();

        if let Some(nickname) = nickname {
            validate_nickname(nickname)?;
            update = update.nickname(nickname);
        }
        if let Some(new_password) = new_password {
            update = update.password(hash_password(new_password)?);
        }

        if update.is_empty() {
            return Ok(account);
        }

        repo.update(account_id, &update)
            .await?
            .ok_or_else(|| PostboxError::NotFound("account".to_string()))
    }

    /// Deactivate an account after verifying its password.
    ///
    /// Deactivated accounts cannot log in, send, or receive new mail.
    /// Their existing delivery links are left untouched.
    pub async fn deactivate(&self, account_id: i64, password: &str) -> Result<()> {
        let repo = AccountRepository::new(self.db.pool());
        let account = repo
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("account".to_string()))?;

        if !account.is_active() {
            return Err(PostboxError::Conflict(
                "account is already deactivated".to_string(),
            ));
        }

        verify_password(password, &account.password)
            .map_err(|_| PostboxError::Auth("current password is incorrect".to_string()))?;

        repo.update(
            account_id,
            &AccountUpdate::new().status(AccountStatus::Deactivated),
        )
        .await?;

        info!("Deactivated account {}", account_id);
        Ok(())
    }
}
