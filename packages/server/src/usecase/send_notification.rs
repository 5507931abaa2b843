//! UseCase: 通知の送信
//!
//! 通知にサーバー時刻を付け、受信者のユーザーキューまたは全体トピックへ配送します。
//! WebSocket（`/app/notification.send`）と REST API の両方から使われます。

use std::sync::Arc;

use hearth_shared::{
    destination::{QUEUE_NOTIFICATIONS, TOPIC_NOTIFICATIONS},
    dto::{Notification, NotificationDraft},
    time::Clock,
};

use crate::domain::{Destination, Username};

use super::{DeliverMessageUseCase, error::NotificationError};

/// 通知送信のユースケース
pub struct SendNotificationUseCase {
    deliver: Arc<DeliverMessageUseCase>,
    clock: Arc<dyn Clock>,
}

impl SendNotificationUseCase {
    pub fn new(deliver: Arc<DeliverMessageUseCase>, clock: Arc<dyn Clock>) -> Self {
        Self { deliver, clock }
    }

    /// `draft.recipient` のユーザーへ `/user/queue/notifications` 経由で送信
    ///
    /// # Returns
    ///
    /// * `Ok(Notification)` - タイムスタンプ付きの送信した通知
    /// * `Err(NotificationError)` - 受信者が不正、またはシリアライズ失敗
    pub async fn send_to_user(
        &self,
        draft: NotificationDraft,
    ) -> Result<Notification, NotificationError> {
        let recipient = Username::new(draft.recipient.clone())
            .map_err(NotificationError::InvalidRecipient)?;
        let notification = draft.stamp(self.clock.now_millis());

        let delivered = self
            .deliver
            .deliver_json_to_user(
                &recipient,
                &Destination::from_static(QUEUE_NOTIFICATIONS),
                &notification,
            )
            .await?;
        tracing::info!(
            "Notification '{}' sent to '{}' ({} subscriptions)",
            notification.title,
            recipient,
            delivered
        );

        Ok(notification)
    }

    /// `/topic/notifications` の購読者全員へ送信
    pub async fn broadcast(
        &self,
        draft: NotificationDraft,
    ) -> Result<Notification, NotificationError> {
        let notification = draft.stamp(self.clock.now_millis());

        let delivered = self
            .deliver
            .deliver_json(&Destination::from_static(TOPIC_NOTIFICATIONS), &notification)
            .await?;
        tracing::info!(
            "Notification '{}' broadcast ({} subscriptions)",
            notification.title,
            delivered
        );

        Ok(notification)
    }
}
