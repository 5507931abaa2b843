//! Events emitted by a running session.

use std::time::Duration;

use hearth_shared::dto::{ChatMessage, Notification};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Handshake completed, subscriptions registered, JOIN published
    Connected { user_id: String },
    /// A chat message arrived on the public room
    MessageReceived(ChatMessage),
    /// A notification arrived on the user queue or the broadcast topic
    NotificationReceived(Notification),
    /// An inbound payload could not be decoded and was dropped
    MalformedPayload { destination: String, error: String },
    /// Transport or protocol failure
    Error(String),
    /// The connection dropped; `retry_in` is `None` when no retry follows
    ConnectionLost { retry_in: Option<Duration> },
    /// The session stopped for good
    Disconnected,
}
