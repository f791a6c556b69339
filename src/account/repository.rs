//! Account repository for postbox.
//!
//! This module provides CRUD operations for accounts in the database.

use sqlx::{QueryBuilder, SqlitePool};

use super::types::{Account, AccountStatus, AccountUpdate, NewAccount};
use crate::{PostboxError, Result};

/// Repository for account CRUD operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account in the database.
    ///
    /// Returns the created account with the assigned ID.
    pub async fn create(&self, new_account: &NewAccount) -> Result<Account> {
        let result = sqlx::query(
            "INSERT INTO accounts (address, password, nickname) VALUES (?, ?, ?)",
        )
        .bind(&new_account.address)
        .bind(&new_account.password)
        .bind(&new_account.nickname)
        .execute(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| PostboxError::NotFound("account".to_string()))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let result = sqlx::query_as::<_, Account>(
            "SELECT id, address, password, nickname, status, created_at, updated_at, deactivated_at
             FROM accounts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get an account by address (case-insensitive).
    pub async fn get_by_address(&self, address: &str) -> Result<Option<Account>> {
        let result = sqlx::query_as::<_, Account>(
            "SELECT id, address, password, nickname, status, created_at, updated_at, deactivated_at
             FROM accounts WHERE address = ? COLLATE NOCASE",
        )
        .bind(address)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Update an account by ID.
    ///
    /// Only fields that are set in the update will be modified; `updated_at`
    /// is bumped on every non-empty update, and `deactivated_at` is stamped
    /// or cleared when the status changes.
    /// Returns the updated account, or None if not found.
    pub async fn update(&self, id: i64, update: &AccountUpdate) -> Result<Option<Account>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE accounts SET ");
        let mut separated = query.separated(", ");

        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref nickname) = update.nickname {
            separated.push("nickname = ");
            separated.push_bind_unseparated(nickname);
        }
        if let Some(status) = update.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status.as_str().to_string());
            match status {
                AccountStatus::Deactivated => {
                    separated.push("deactivated_at = datetime('now')");
                }
                AccountStatus::Active => {
                    separated.push("deactivated_at = NULL");
                }
            }
        }
        separated.push("updated_at = datetime('now')");

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// List all active accounts, ordered by address.
    pub async fn list_active(&self) -> Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT id, address, password, nickname, status, created_at, updated_at, deactivated_at
             FROM accounts WHERE status = 'active' ORDER BY address",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| PostboxError::Database(e.to_string()))?;

        Ok(accounts)
    }

    /// Count all accounts.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(self.pool)
            .await
            .map_err(|e| PostboxError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Count active accounts.
    pub async fn count_active(&self) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE status = 'active'")
                .fetch_one(self.pool)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Check if an address is already taken (case-insensitive).
    pub async fn address_exists(&self, address: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM accounts WHERE address = ? COLLATE NOCASE)")
                .bind(address)
                .fetch_one(self.pool)
                .await
                .map_err(|e| PostboxError::Database(e.to_string()))?;
        Ok(exists.0)
    }
}
