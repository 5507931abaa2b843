//! UseCase: セッション切断処理
//!
//! セッションを削除し、ユーザー名が設定されていれば `/topic/public` に
//! LEAVE を配送します。

use std::sync::Arc;

use hearth_shared::{destination::TOPIC_PUBLIC, dto::ChatMessage, time::Clock};

use crate::domain::{Destination, MessagePusher, SessionId, SessionRepository};

use super::{DeliverMessageUseCase, error::DisconnectError};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    deliver: Arc<DeliverMessageUseCase>,
    clock: Arc<dyn Clock>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        deliver: Arc<DeliverMessageUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            deliver,
            clock,
        }
    }

    /// セッション切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(ChatMessage))` - 配送した LEAVE
    /// * `Ok(None)` - ユーザー名が未設定のため LEAVE なし
    /// * `Err(DisconnectError)` - セッションが存在しない
    pub async fn execute(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ChatMessage>, DisconnectError> {
        // 1. Repository からセッションを削除
        let session = self.repository.remove_session(session_id).await?;

        // 2. MessagePusher から登録解除
        self.message_pusher.unregister_client(session_id).await;

        // 3. 残っているセッションに LEAVE を配送
        let Some(username) = session.username else {
            return Ok(None);
        };
        let leave = ChatMessage::leave(
            username.as_str(),
            format!("{} left the chat!", username),
            self.clock.now_millis(),
        );
        self.deliver
            .deliver_json(&Destination::from_static(TOPIC_PUBLIC), &leave)
            .await?;
        tracing::info!("'{}' left the chat", username);

        Ok(Some(leave))
    }
}
