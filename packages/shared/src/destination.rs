//! STOMP endpoint and destinations shared by the broker and the session.

/// WebSocket endpoint path the broker listens on
pub const WS_ENDPOINT: &str = "/ws";

/// Prefix of destinations handled by the broker's application routes
pub const APP_PREFIX: &str = "/app";

/// Prefix of per-user destinations
pub const USER_PREFIX: &str = "/user";

/// Public chat room broadcast
pub const TOPIC_PUBLIC: &str = "/topic/public";

/// Broadcast notifications
pub const TOPIC_NOTIFICATIONS: &str = "/topic/notifications";

/// Per-user notification queue, as addressed by the broker
pub const QUEUE_NOTIFICATIONS: &str = "/queue/notifications";

/// Per-user notification queue, as subscribed by a client
pub const USER_QUEUE_NOTIFICATIONS: &str = "/user/queue/notifications";

pub const APP_CHAT_ADD_USER: &str = "/app/chat.addUser";
pub const APP_CHAT_SEND_MESSAGE: &str = "/app/chat.sendMessage";
pub const APP_NOTIFICATION_SEND: &str = "/app/notification.send";

/// Build the client-side destination of a per-user queue
/// (`/queue/notifications` -> `/user/queue/notifications`).
pub fn user_destination(destination: &str) -> String {
    format!("{}{}", USER_PREFIX, destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_destination_matches_subscribed_queue() {
        // テスト項目: ユーザー宛キューがクライアントの購読先と一致する
        // given (前提条件):
        let destination = QUEUE_NOTIFICATIONS;

        // when (操作):
        let result = user_destination(destination);

        // then (期待する結果):
        assert_eq!(result, USER_QUEUE_NOTIFICATIONS);
    }
}
