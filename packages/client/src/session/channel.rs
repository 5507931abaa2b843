//! The three fixed inbound subscriptions.

use hearth_shared::destination::{TOPIC_NOTIFICATIONS, TOPIC_PUBLIC, USER_QUEUE_NOTIFICATIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// `/topic/public`, carries chat messages
    PublicChat,
    /// `/user/queue/notifications`, notifications addressed to this user
    UserNotifications,
    /// `/topic/notifications`, notifications for everyone
    BroadcastNotifications,
}

impl Channel {
    /// Subscription order on connect
    pub const ALL: [Channel; 3] = [
        Channel::PublicChat,
        Channel::UserNotifications,
        Channel::BroadcastNotifications,
    ];

    pub fn destination(&self) -> &'static str {
        match self {
            Channel::PublicChat => TOPIC_PUBLIC,
            Channel::UserNotifications => USER_QUEUE_NOTIFICATIONS,
            Channel::BroadcastNotifications => TOPIC_NOTIFICATIONS,
        }
    }

    pub fn subscription_id(&self) -> &'static str {
        match self {
            Channel::PublicChat => "sub-0",
            Channel::UserNotifications => "sub-1",
            Channel::BroadcastNotifications => "sub-2",
        }
    }

    pub fn from_subscription_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.subscription_id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_ids_map_back_to_channels() {
        // テスト項目: 購読 ID から元のチャンネルが引ける
        // given (前提条件):

        // when (操作) / then (期待する結果):
        for channel in Channel::ALL {
            assert_eq!(
                Channel::from_subscription_id(channel.subscription_id()),
                Some(channel)
            );
        }
        assert_eq!(Channel::from_subscription_id("sub-9"), None);
    }

    #[test]
    fn test_channels_cover_fixed_destinations() {
        // テスト項目: 3 つのチャンネルが固定の購読先に対応する
        // given (前提条件):

        // when (操作):
        let destinations: Vec<&str> = Channel::ALL.iter().map(|c| c.destination()).collect();

        // then (期待する結果):
        assert_eq!(
            destinations,
            vec![
                "/topic/public",
                "/user/queue/notifications",
                "/topic/notifications"
            ]
        );
    }
}
