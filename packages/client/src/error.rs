//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// User ID is empty or blank
    #[error("Invalid user ID '{0}': must not be empty")]
    InvalidUserId(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Terminal input could not be read
    #[error("Readline error: {0}")]
    Readline(String),
}
