//! UseCase: 購読・購読解除

use std::sync::Arc;

use crate::domain::{Destination, SessionId, SessionRepository, Subscription, SubscriptionId};

use super::error::SubscribeError;

/// 購読管理のユースケース
pub struct SubscribeUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl SubscribeUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// SUBSCRIBE: 同じ ID の購読があれば置き換える
    pub async fn subscribe(
        &self,
        session_id: &SessionId,
        subscription_id: &str,
        destination: &str,
    ) -> Result<(), SubscribeError> {
        let subscription = Subscription::new(
            SubscriptionId::new(subscription_id.to_string())?,
            Destination::new(destination.to_string())?,
        );
        self.repository
            .add_subscription(session_id, subscription)
            .await?;
        tracing::debug!(
            "Session '{}' subscribed to {} as '{}'",
            session_id,
            destination,
            subscription_id
        );
        Ok(())
    }

    /// UNSUBSCRIBE: 未知の ID は何もしない
    pub async fn unsubscribe(
        &self,
        session_id: &SessionId,
        subscription_id: &str,
    ) -> Result<bool, SubscribeError> {
        let id = SubscriptionId::new(subscription_id.to_string())?;
        let removed = self.repository.remove_subscription(session_id, &id).await?;
        if !removed {
            tracing::debug!(
                "Session '{}' has no subscription '{}'",
                session_id,
                subscription_id
            );
        }
        Ok(removed)
    }
}
