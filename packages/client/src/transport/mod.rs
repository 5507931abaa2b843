//! Transports carrying STOMP text between the session and a broker.
//!
//! A [`Connector`] opens a [`TransportLink`]: a pair of channels the session
//! driver uses to write encoded frames and read raw inbound text. Closing is
//! done by dropping the link.

mod loopback;
mod websocket;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub use loopback::{LoopbackConnector, LoopbackPeer};
pub use websocket::WebSocketConnector;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to connect to {url}: {reason}")]
    ConnectFailed { url: String, reason: String },

    #[error("Transport error: {0}")]
    Io(String),
}

/// Raw inbound text, or the error that ended the stream
pub type InboundText = Result<String, TransportError>;

/// An open connection.
///
/// `incoming` yields `None` once the peer has gone away.
#[derive(Debug)]
pub struct TransportLink {
    pub outgoing: mpsc::UnboundedSender<String>,
    pub incoming: mpsc::UnboundedReceiver<InboundText>,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<TransportLink, TransportError>;
}
