//! Chat session: connection lifecycle, inbound buffering and publishing.

mod channel;
mod driver;
mod event;
mod state;

use std::sync::Arc;

use hearth_shared::{
    destination::{APP_CHAT_SEND_MESSAGE, APP_NOTIFICATION_SEND},
    dto::{ChatMessage, Notification, NotificationDraft},
    stomp::Frame,
    time::{Clock, SystemClock},
};
use serde::Serialize;
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    task::JoinHandle,
};

pub use channel::Channel;
pub use event::SessionEvent;
pub use state::SessionState;

use crate::{
    config::SessionConfig,
    domain::UserId,
    error::ClientError,
    transport::{Connector, WebSocketConnector},
};
use driver::{Driver, SessionCommand};

const EVENT_CAPACITY: usize = 256;

/// Handle to the running connection driver
struct Connection {
    commands: mpsc::UnboundedSender<SessionCommand>,
    task: JoinHandle<()>,
}

impl Connection {
    async fn close(self) {
        // The driver may already have stopped on its own.
        let _ = self.commands.send(SessionCommand::Disconnect);
        if let Err(e) = self.task.await {
            tracing::error!("Connection driver panicked: {}", e);
        }
    }
}

/// A client session against the chat broker.
///
/// `connect` returns as soon as the connection driver has been started; the
/// outcome of the handshake is reported through [`SessionEvent`]s and
/// reflected by [`ChatSession::is_connected`].
pub struct ChatSession {
    config: SessionConfig,
    connector: Arc<dyn Connector>,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
    connection: Option<Connection>,
}

impl ChatSession {
    /// Session over WebSocket using the system clock
    pub fn new(config: SessionConfig) -> Self {
        Self::with_connector(config, Arc::new(WebSocketConnector), Arc::new(SystemClock))
    }

    pub fn with_connector(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            connector,
            clock,
            state: Arc::new(Mutex::new(SessionState::default())),
            events,
            connection: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Start connecting as `user_id`.
    ///
    /// An existing connection is closed first. Only an invalid user ID is
    /// reported here; transport failures arrive as events.
    pub async fn connect(&mut self, user_id: &str) -> Result<(), ClientError> {
        let user_id = UserId::new(user_id)?;

        if let Some(previous) = self.connection.take() {
            tracing::info!("Replacing existing connection");
            previous.close().await;
        }

        {
            let mut state = self.state.lock().await;
            state.is_connected = false;
            state.current_user_id = Some(user_id.to_string());
        }

        let (commands, receiver) = mpsc::unbounded_channel();
        let driver = Driver::new(
            self.config.clone(),
            Arc::clone(&self.connector),
            Arc::clone(&self.clock),
            Arc::clone(&self.state),
            self.events.clone(),
            user_id,
            receiver,
        );
        let task = tokio::spawn(driver.run());
        self.connection = Some(Connection { commands, task });

        Ok(())
    }

    /// Send DISCONNECT and stop the driver. Does nothing when not connected.
    pub async fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            tracing::debug!("disconnect called without a connection");
            return;
        };
        connection.close().await;
        self.state.lock().await.is_connected = false;
    }

    /// Publish a chat message as the current user.
    ///
    /// Dropped when not connected. The message is not appended locally; it
    /// comes back through the public topic.
    pub async fn send_message(&self, content: &str) {
        let Some(sender) = self.connected_user().await else {
            tracing::debug!("Not connected; message not sent");
            return;
        };
        let message = ChatMessage::chat(sender, content, self.clock.now_millis());
        self.publish(APP_CHAT_SEND_MESSAGE, &message);
    }

    /// Stamp `draft` with the current time and publish it. Dropped when not connected.
    pub async fn send_notification(&self, draft: NotificationDraft) {
        if self.connected_user().await.is_none() {
            tracing::debug!("Not connected; notification not sent");
            return;
        }
        let notification = draft.stamp(self.clock.now_millis());
        self.publish(APP_NOTIFICATION_SEND, &notification);
    }

    pub async fn clear_messages(&self) {
        self.state.lock().await.messages.clear();
    }

    pub async fn clear_notifications(&self) {
        self.state.lock().await.notifications.clear();
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.is_connected
    }

    pub async fn current_user_id(&self) -> Option<String> {
        self.state.lock().await.current_user_id.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().await.messages.clone()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.clone()
    }

    /// Copy of the whole state at one instant
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    async fn connected_user(&self) -> Option<String> {
        let state = self.state.lock().await;
        if state.is_connected {
            state.current_user_id.clone()
        } else {
            None
        }
    }

    fn publish<T: Serialize>(&self, destination: &str, payload: &T) {
        let Some(connection) = &self.connection else {
            return;
        };
        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to serialize payload for {}: {}", destination, e);
                return;
            }
        };
        if connection
            .commands
            .send(SessionCommand::Publish(Frame::send(destination, body)))
            .is_err()
        {
            tracing::debug!("Connection driver stopped; dropping publish to {}", destination);
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.commands.send(SessionCommand::Disconnect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackConnector;
    use hearth_shared::time::FixedClock;

    fn loopback_session() -> ChatSession {
        let (connector, _peers) = LoopbackConnector::new();
        ChatSession::with_connector(
            SessionConfig::default(),
            Arc::new(connector),
            Arc::new(FixedClock::new(1_000)),
        )
    }

    #[tokio::test]
    async fn test_new_session_starts_disconnected_and_empty() {
        // テスト項目: 生成直後のセッションは未接続で空の状態を持つ
        // given (前提条件):
        let session = loopback_session();

        // when (操作):
        let state = session.snapshot().await;

        // then (期待する結果):
        assert_eq!(state, SessionState::default());
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_user_id() {
        // テスト項目: 空のユーザー ID では接続できない
        // given (前提条件):
        let mut session = loopback_session();

        // when (操作):
        let result = session.connect("  ").await;

        // then (期待する結果):
        assert_eq!(result, Err(ClientError::InvalidUserId("  ".to_string())));
        assert_eq!(session.current_user_id().await, None);
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_disconnect_without_connection_is_noop() {
        // テスト項目: 未接続での disconnect は何もしない
        // given (前提条件):
        let mut session = loopback_session();
        let mut events = session.subscribe();

        // when (操作):
        session.disconnect().await;

        // then (期待する結果):
        assert!(!session.is_connected().await);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_while_disconnected_is_dropped() {
        // テスト項目: 未接続での送信は黙って破棄される
        // given (前提条件):
        let session = loopback_session();

        // when (操作):
        session.send_message("hello").await;
        session
            .send_notification(NotificationDraft::new(
                "t",
                "m",
                hearth_shared::dto::NotificationType::Info,
                "bob",
            ))
            .await;

        // then (期待する結果):
        assert!(session.messages().await.is_empty());
        assert!(session.notifications().await.is_empty());
    }
}
