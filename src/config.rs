//! Configuration module for postbox.

use serde::Deserialize;
use std::path::Path;

use crate::delivery::SendPolicy;
use crate::{PostboxError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/postbox.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Mail handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Policy for sends that include invalid recipients
    /// ("strict" or "skip-invalid").
    #[serde(default)]
    pub send_policy: SendPolicy,
    /// Days a trashed mail stays restorable before the sweep removes it.
    #[serde(default = "default_trash_retention_days")]
    pub trash_retention_days: u32,
    /// Maximum subject length in characters.
    #[serde(default = "default_max_subject_length")]
    pub max_subject_length: usize,
    /// Maximum body length in characters.
    #[serde(default = "default_max_body_length")]
    pub max_body_length: usize,
}

fn default_trash_retention_days() -> u32 {
    crate::trash::DEFAULT_TRASH_RETENTION_DAYS
}

fn default_max_subject_length() -> usize {
    crate::delivery::DEFAULT_MAX_SUBJECT_LENGTH
}

fn default_max_body_length() -> usize {
    crate::delivery::DEFAULT_MAX_BODY_LENGTH
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            send_policy: SendPolicy::default(),
            trash_retention_days: default_trash_retention_days(),
            max_subject_length: default_max_subject_length(),
            max_body_length: default_max_body_length(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/postbox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Mail handling configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PostboxError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PostboxError::Validation(format!("config parse error: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.mail.trash_retention_days == 0 {
            return Err(PostboxError::Validation(
                "trash_retention_days must be at least 1".to_string(),
            ));
        }
        if self.mail.max_subject_length == 0 || self.mail.max_body_length == 0 {
            return Err(PostboxError::Validation(
                "subject and body length limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
