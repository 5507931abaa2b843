//! Observable session state.

use hearth_shared::dto::{ChatMessage, Notification};

/// Snapshot of what the hosting UI reads.
///
/// Sequences keep arrival order and survive both transient connection loss
/// and explicit disconnect; only the clear operations empty them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_connected: bool,
    pub current_user_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub notifications: Vec<Notification>,
}
