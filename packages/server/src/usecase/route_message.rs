//! UseCase: SEND フレームのルーティング
//!
//! `/app` で始まる宛先はアプリケーションのハンドラへ、それ以外はそのまま
//! 購読者へ配送します。
//!
//! | 宛先 | 処理 | 配送先 |
//! |---|---|---|
//! | `/app/chat.sendMessage` | サーバー時刻を設定 | `/topic/public` |
//! | `/app/chat.addUser` | ユーザー名をセッションに設定し JOIN に変換 | `/topic/public` |
//! | `/app/notification.send` | サーバー時刻を設定 | `/topic/notifications` |

use std::sync::Arc;

use hearth_shared::{
    destination::{
        APP_CHAT_ADD_USER, APP_CHAT_SEND_MESSAGE, APP_NOTIFICATION_SEND, TOPIC_PUBLIC,
    },
    dto::{ChatMessage, MessageType, NotificationDraft},
    time::Clock,
};
use serde::de::DeserializeOwned;

use crate::domain::{Destination, SessionId, SessionRepository, Username};

use super::{DeliverMessageUseCase, SendNotificationUseCase, error::RouteError};

/// SEND ルーティングのユースケース
pub struct RouteMessageUseCase {
    repository: Arc<dyn SessionRepository>,
    deliver: Arc<DeliverMessageUseCase>,
    send_notification: Arc<SendNotificationUseCase>,
    clock: Arc<dyn Clock>,
}

impl RouteMessageUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        deliver: Arc<DeliverMessageUseCase>,
        send_notification: Arc<SendNotificationUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            deliver,
            send_notification,
            clock,
        }
    }

    /// SEND を処理する
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 配送できた購読の数
    /// * `Err(RouteError)` - 未知の `/app` 宛先、不正なペイロードなど
    pub async fn execute(
        &self,
        session_id: &SessionId,
        destination: &str,
        body: &str,
    ) -> Result<usize, RouteError> {
        let destination =
            Destination::new(destination.to_string()).map_err(RouteError::InvalidDestination)?;

        if !destination.is_application() {
            return Ok(self.deliver.deliver(&destination, body).await);
        }

        match destination.as_str() {
            APP_CHAT_SEND_MESSAGE => self.send_message(&destination, body).await,
            APP_CHAT_ADD_USER => self.add_user(session_id, &destination, body).await,
            APP_NOTIFICATION_SEND => {
                let draft: NotificationDraft = parse(&destination, body)?;
                self.send_notification.broadcast(draft).await?;
                Ok(1)
            }
            other => Err(RouteError::UnknownDestination(other.to_string())),
        }
    }

    async fn send_message(&self, destination: &Destination, body: &str) -> Result<usize, RouteError> {
        let mut message: ChatMessage = parse(destination, body)?;
        message.timestamp = self.clock.now_millis();

        Ok(self
            .deliver
            .deliver_json(&Destination::from_static(TOPIC_PUBLIC), &message)
            .await?)
    }

    async fn add_user(
        &self,
        session_id: &SessionId,
        destination: &Destination,
        body: &str,
    ) -> Result<usize, RouteError> {
        let mut message: ChatMessage = parse(destination, body)?;
        let username =
            Username::new(message.sender.clone()).map_err(|e| RouteError::InvalidPayload {
                destination: destination.to_string(),
                reason: e.to_string(),
            })?;

        self.repository
            .bind_username(session_id, username.clone())
            .await?;
        tracing::info!("Session '{}' joined as '{}'", session_id, username);

        message.r#type = MessageType::Join;
        message.content = format!("{} joined the chat!", username);
        message.timestamp = self.clock.now_millis();

        Ok(self
            .deliver
            .deliver_json(&Destination::from_static(TOPIC_PUBLIC), &message)
            .await?)
    }
}

fn parse<T: DeserializeOwned>(destination: &Destination, body: &str) -> Result<T, RouteError> {
    serde_json::from_str(body).map_err(|e| RouteError::InvalidPayload {
        destination: destination.to_string(),
        reason: e.to_string(),
    })
}
