//! Data Transfer Objects (DTOs) for the chat application.
//!
//! DTOs are organized by concern:
//! - `chat`: chat messages and notifications carried in STOMP frame bodies
//! - `social`: friend, group and API envelope shapes of the wider REST contract

pub mod chat;
pub mod social;

pub use chat::{ChatMessage, MessageType, Notification, NotificationDraft, NotificationType};
