//! Error types for postbox.

use thiserror::Error;

/// Common error type for postbox operations.
#[derive(Error, Debug)]
pub enum PostboxError {
    /// Database error.
    ///
    /// Wraps storage-layer failures. By the time one surfaces, the
    /// enclosing transaction has been rolled back.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for caller input, raised before anything is persisted.
    #[error("validation error: {0}")]
    Validation(String),

    /// One or more recipient addresses are unknown or deactivated.
    ///
    /// Under the strict send policy this aborts the whole delivery.
    #[error("invalid recipients: {}", .0.join(", "))]
    InvalidRecipients(Vec<String>),

    /// Resource not found, or not visible to the calling account.
    #[error("{0} not found")]
    NotFound(String),

    /// The operation lost a race or repeated a completed state change.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for PostboxError {
    fn from(e: sqlx::Error) -> Self {
        PostboxError::Database(e.to_string())
    }
}

/// Result type alias for postbox operations.
pub type Result<T> = std::result::Result<T, PostboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = PostboxError::Auth("invalid password".to_string());
        assert_eq!(err.to_string(), "authentication error: invalid password");
    }

    #[test]
    fn test_validation_error_display() {
        let err = PostboxError::Validation("subject is empty".to_string());
        assert_eq!(err.to_string(), "validation error: subject is empty");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = PostboxError::NotFound("message".to_string());
        assert_eq!(err.to_string(), "message not found");
    }

    #[test]
    fn test_invalid_recipients_display() {
        let err = PostboxError::InvalidRecipients(vec![
            "ghost@example.com".to_string(),
            "gone@example.com".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid recipients: ghost@example.com, gone@example.com"
        );
    }

    #[test]
    fn test_conflict_error_display() {
        let err = PostboxError::Conflict("mail is already in the trash".to_string());
        assert_eq!(err.to_string(), "conflict: mail is already in the trash");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PostboxError = io_err.into();
        assert!(matches!(err, PostboxError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(PostboxError::Auth("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
