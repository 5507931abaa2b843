//! UseCase: 購読者への MESSAGE 配送
//!
//! 宛先を購読している全ての購読について MESSAGE フレームを 1 つずつ作成し、
//! 購読 ID とブローカー内で一意な message-id を付けて送信します。

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use hearth_shared::stomp::Frame;
use serde::Serialize;

use crate::domain::{Destination, MessagePusher, SessionRepository, Subscriber, Username};

use super::error::DeliverError;

/// MESSAGE 配送のユースケース
pub struct DeliverMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    next_message_id: AtomicU64,
}

impl DeliverMessageUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            next_message_id: AtomicU64::new(0),
        }
    }

    /// `destination` の購読者全員に `body` を配送
    ///
    /// # Returns
    ///
    /// 配送できた購読の数
    pub async fn deliver(&self, destination: &Destination, body: &str) -> usize {
        let subscribers = self.repository.find_subscribers(destination).await;
        self.push_all(subscribers, body).await
    }

    /// ユーザー宛て宛先（例: `/queue/notifications`）へ配送
    ///
    /// `username` のセッションのうち `/user` 付きの宛先を購読しているものが対象。
    pub async fn deliver_to_user(
        &self,
        username: &Username,
        destination: &Destination,
        body: &str,
    ) -> usize {
        let subscribers = self
            .repository
            .find_user_subscribers(username, &destination.for_user())
            .await;
        self.push_all(subscribers, body).await
    }

    /// JSON にシリアライズして `destination` へ配送
    pub async fn deliver_json<T: Serialize + Sync>(
        &self,
        destination: &Destination,
        payload: &T,
    ) -> Result<usize, DeliverError> {
        let body = to_json(payload)?;
        Ok(self.deliver(destination, &body).await)
    }

    /// JSON にシリアライズしてユーザー宛て宛先へ配送
    pub async fn deliver_json_to_user<T: Serialize + Sync>(
        &self,
        username: &Username,
        destination: &Destination,
        payload: &T,
    ) -> Result<usize, DeliverError> {
        let body = to_json(payload)?;
        Ok(self.deliver_to_user(username, destination, &body).await)
    }

    async fn push_all(&self, subscribers: Vec<Subscriber>, body: &str) -> usize {
        let mut delivered = 0;
        for subscriber in subscribers {
            let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
            let frame = Frame::message(
                subscriber.destination.as_str(),
                subscriber.subscription_id.as_str(),
                &format!("message-{}", message_id),
                body,
            );
            // 一部の送信失敗は許容する（切断処理中のセッションなど）
            match self
                .message_pusher
                .push_to(&subscriber.session_id, &frame.encode())
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    "Failed to deliver to session '{}': {}",
                    subscriber.session_id,
                    e
                ),
            }
        }
        delivered
    }
}

fn to_json<T: Serialize>(payload: &T) -> Result<String, DeliverError> {
    serde_json::to_string(payload).map_err(|e| DeliverError::Serialize(e.to_string()))
}
