//! Error types for the Hirafi plugin.
//!
//! This module defines the centralized error type [`HirafiError`] and a type alias
//! [`Result`] used throughout the crate. Errors only ever travel as far as the
//! event handler: no failure is allowed to take the plugin down, and most are
//! converted into a neutral UI state or an alert before they reach the user.

use thiserror::Error;

/// The main error type for Hirafi operations.
///
/// # Examples
///
/// ```
/// use hirafi::domain::HirafiError;
///
/// fn read_table() -> Result<(), HirafiError> {
///     Err(HirafiError::Storage("unknown table: jobs".to_string()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum HirafiError {
    /// Local storage operation failed (session slot or table file).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Theme parsing or application failed.
    #[error("Theme error: {0}")]
    Theme(String),

    /// Communication with the background worker failed.
    #[error("Worker communication error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote store answered with a non-success status.
    ///
    /// `status` is the HTTP status code; `message` is a compact preview of the
    /// response body, which is what the booking alert shows verbatim.
    #[error("Remote error (status {status}): {message}")]
    Remote {
        /// HTTP status code returned by the store.
        status: u16,
        /// Compact body preview or transport description.
        message: String,
    },

    /// A payload could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl HirafiError {
    /// Builds a [`HirafiError::Remote`] from a status and message.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// The underlying message without the category prefix.
    ///
    /// This is the text alerts show to the user.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Storage(message)
            | Self::Theme(message)
            | Self::Worker(message)
            | Self::Config(message)
            | Self::Decode(message)
            | Self::Remote { message, .. } => message.clone(),
            Self::Io(e) => e.to_string(),
        }
    }
}

impl From<serde_json::Error> for HirafiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// A specialized `Result` type for Hirafi operations.
pub type Result<T> = std::result::Result<T, HirafiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_message_carries_status_and_body() {
        let error = HirafiError::remote(409, "duplicate key");
        assert_eq!(error.to_string(), "Remote error (status 409): duplicate key");
    }

    #[test]
    fn detail_drops_the_category_prefix() {
        let error = HirafiError::remote(409, "duplicate key");
        assert_eq!(error.detail(), "duplicate key");
        assert_eq!(HirafiError::Storage("disk full".into()).detail(), "disk full");
    }

    #[test]
    fn json_errors_convert_to_decode() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(HirafiError::from(parse), HirafiError::Decode(_)));
    }
}
