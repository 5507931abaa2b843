//! Infrastructure 層
//!
//! ドメイン層の trait（`SessionRepository`, `MessagePusher`）の具体的な実装。

pub mod message_pusher;
pub mod repository;
