//! STOMP codec errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StompError {
    #[error("Unknown STOMP command '{0}'")]
    UnknownCommand(String),

    #[error("Malformed header line '{0}'")]
    MalformedHeader(String),

    #[error("Frame is not valid UTF-8")]
    InvalidEncoding,

    #[error("Frame body is not terminated by NUL")]
    MissingNul,

    #[error("Invalid content-length '{0}'")]
    InvalidContentLength(String),

    #[error("Invalid heart-beat header '{0}'")]
    InvalidHeartBeat(String),

    #[error("Frame exceeds {0} bytes")]
    FrameTooLarge(usize),

    #[error("Missing required header '{0}'")]
    MissingHeader(&'static str),
}
