//! UseCase: STOMP セッション接続処理
//!
//! CONNECT フレームを受け付けた WebSocket をセッションとして登録します。

use std::sync::Arc;

use hearth_shared::time::Clock;

use crate::domain::{
    MessagePusher, PusherChannel, Session, SessionId, SessionRepository, Username,
};

use super::error::ConnectError;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// セッション接続を実行
    ///
    /// # Arguments
    ///
    /// * `session_id` - WebSocket 接続ごとに生成した ID
    /// * `login` - CONNECT の `login` ヘッダ（あればユーザー名として使う）
    /// * `sender` - セッションへのフレーム送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - 登録したセッション
    /// * `Err(ConnectError)` - 同じ ID のセッションが既に存在する
    pub async fn execute(
        &self,
        session_id: SessionId,
        login: Option<Username>,
        sender: PusherChannel,
    ) -> Result<Session, ConnectError> {
        let session = Session::new(session_id.clone(), login, self.clock.now_millis());

        // 1. Repository にセッションを追加
        self.repository.add_session(session.clone()).await?;

        // 2. MessagePusher に送信チャンネルを登録
        self.message_pusher
            .register_client(session_id, sender)
            .await;

        Ok(session)
    }
}
