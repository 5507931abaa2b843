//! Server state shared by the handlers.

use std::sync::Arc;

use hearth_shared::stomp::HeartBeat;

use crate::usecase::{
    ConnectSessionUseCase, DisconnectSessionUseCase, RouteMessageUseCase, SendNotificationUseCase,
    SubscribeUseCase,
};

/// Shared application state
pub struct AppState {
    /// Heart-beat offered in CONNECTED
    pub heart_beat: HeartBeat,
    /// ConnectSessionUseCase（セッション接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// SubscribeUseCase（購読管理のユースケース）
    pub subscribe_usecase: Arc<SubscribeUseCase>,
    /// RouteMessageUseCase（SEND ルーティングのユースケース）
    pub route_message_usecase: Arc<RouteMessageUseCase>,
    /// SendNotificationUseCase（通知送信のユースケース）
    pub send_notification_usecase: Arc<SendNotificationUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
}
