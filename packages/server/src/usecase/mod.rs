//! UseCase 層
//!
//! STOMP セッションのライフサイクルとメッセージ配送のビジネスロジック。

mod connect_session;
mod deliver_message;
mod disconnect_session;
mod error;
mod route_message;
mod send_notification;
mod subscribe;

pub use connect_session::ConnectSessionUseCase;
pub use deliver_message::DeliverMessageUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{
    ConnectError, DeliverError, DisconnectError, NotificationError, RouteError, SubscribeError,
};
pub use route_message::RouteMessageUseCase;
pub use send_notification::SendNotificationUseCase;
pub use subscribe::SubscribeUseCase;
