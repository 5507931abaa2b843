//! Chat and notification payloads.
//!
//! Field names are case-sensitive on the wire:
//! `type/content/sender/timestamp` for messages and
//! `title/message/type/recipient/timestamp` for notifications.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Chat message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Chat,
    Join,
    Leave,
}

/// Chat message published to and received from the public room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub r#type: MessageType,
    pub content: String,
    pub sender: String,
    /// Unix timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn chat(sender: impl Into<String>, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            r#type: MessageType::Chat,
            content: content.into(),
            sender: sender.into(),
            timestamp,
        }
    }

    /// JOIN announcement; the content is left empty for the broker to fill in
    pub fn join(sender: impl Into<String>, timestamp: i64) -> Self {
        Self {
            r#type: MessageType::Join,
            content: String::new(),
            sender: sender.into(),
            timestamp,
        }
    }

    pub fn leave(sender: impl Into<String>, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            r#type: MessageType::Leave,
            content: content.into(),
            sender: sender.into(),
            timestamp,
        }
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationType::Info => "INFO",
            NotificationType::Success => "SUCCESS",
            NotificationType::Warning => "WARNING",
            NotificationType::Error => "ERROR",
        };
        f.write_str(label)
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(NotificationType::Info),
            "SUCCESS" => Ok(NotificationType::Success),
            "WARNING" => Ok(NotificationType::Warning),
            "ERROR" => Ok(NotificationType::Error),
            other => Err(format!("unknown notification type '{}'", other)),
        }
    }
}

/// Notification delivered to one user or broadcast to everyone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub r#type: NotificationType,
    pub recipient: String,
    /// Unix timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

/// Notification without a timestamp; stamped right before publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub r#type: NotificationType,
    pub recipient: String,
}

impl NotificationDraft {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        r#type: NotificationType,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            r#type,
            recipient: recipient.into(),
        }
    }

    pub fn stamp(self, timestamp: i64) -> Notification {
        Notification {
            title: self.title,
            message: self.message,
            r#type: self.r#type,
            recipient: self.recipient,
            timestamp,
        }
    }
}
