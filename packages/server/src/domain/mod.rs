//! ドメイン層
//!
//! STOMP セッション・購読・宛先のモデルと、UseCase 層が依存するインターフェース
//! （`SessionRepository`, `MessagePusher`）を定義します。

mod entity;
mod error;
mod message_pusher;
mod repository;
mod value_object;

pub use entity::{Session, Subscriber, Subscription};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::SessionRepository;
pub use value_object::{Destination, SessionId, SessionIdFactory, SubscriptionId, Username};
