//! STOMP-over-WebSocket chat client.
//!
//! The core is [`ChatSession`]: it connects to the broker, subscribes to the
//! public chat room and both notification channels, buffers what arrives and
//! publishes chat messages and notifications. The `hearth-client` binary wraps
//! it in an interactive terminal UI.

pub mod config;
pub mod domain;
pub mod error;
pub mod session;
pub mod transport;

mod command;
mod formatter;
mod runner;

pub use config::SessionConfig;
pub use error::ClientError;
pub use runner::run_client;
pub use session::{ChatSession, SessionEvent, SessionState};
