//! Message formatting utilities for client display.

use hearth_shared::{
    dto::{ChatMessage, MessageType, Notification},
    time::timestamp_to_rfc3339,
};

use crate::session::SessionEvent;

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a session event, or `None` for events that print nothing
    pub fn format_event(event: &SessionEvent, current_user_id: &str) -> Option<String> {
        let text = match event {
            SessionEvent::Connected { user_id } => Self::format_connected(user_id),
            SessionEvent::MessageReceived(message) => {
                Self::format_chat_message(message, current_user_id)
            }
            SessionEvent::NotificationReceived(notification) => {
                Self::format_notification(notification)
            }
            SessionEvent::MalformedPayload { destination, error } => {
                format!("\n! Dropped malformed message on {}: {}\n", destination, error)
            }
            SessionEvent::Error(reason) => format!("\n! {}\n", reason),
            SessionEvent::ConnectionLost { retry_in } => match retry_in {
                Some(delay) => format!(
                    "\n! Connection lost, reconnecting in {} ms\n",
                    delay.as_millis()
                ),
                None => "\n! Connection lost\n".to_string(),
            },
            SessionEvent::Disconnected => return None,
        };
        Some(text)
    }

    pub fn format_connected(user_id: &str) -> String {
        format!(
            "\nConnected as '{}'. Type messages and press Enter to send, /help for commands.\n",
            user_id
        )
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `message` - The received message
    /// * `current_user_id` - The current user's ID (to mark as "me")
    ///
    /// # Returns
    ///
    /// A formatted string; JOIN and LEAVE are shown as one-line events
    pub fn format_chat_message(message: &ChatMessage, current_user_id: &str) -> String {
        let timestamp_str = timestamp_to_rfc3339(message.timestamp);
        let me_suffix = if message.sender == current_user_id {
            " (me)"
        } else {
            ""
        };
        match message.r#type {
            MessageType::Join => format!(
                "\n+ {}{} joined at {}\n",
                message.sender, me_suffix, timestamp_str
            ),
            MessageType::Leave => format!(
                "\n- {}{} left at {}\n",
                message.sender, me_suffix, timestamp_str
            ),
            MessageType::Chat => format!(
                "\n\n{rule}\n@{}{}: {}\nsent at {}\n{rule}\n",
                message.sender,
                me_suffix,
                message.content,
                timestamp_str,
                rule = RULE
            ),
        }
    }

    /// Format a notification with its severity, recipient and time
    pub fn format_notification(notification: &Notification) -> String {
        format!(
            "\n[{}] {} (to {})\n{}\nat {}\n",
            notification.r#type,
            notification.title,
            notification.recipient,
            notification.message,
            timestamp_to_rfc3339(notification.timestamp)
        )
    }
}
