//! Session configuration.
//!
//! Heart-beat and reconnect values are fixed policy, passed straight to the
//! connection driver.

use std::time::Duration;

use hearth_shared::stomp::HeartBeat;

/// Default broker endpoint
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";

/// Heart-beat period in both directions (milliseconds)
pub const DEFAULT_HEARTBEAT_MILLIS: u64 = 4000;

/// Delay before reconnecting after a lost connection (milliseconds)
pub const DEFAULT_RECONNECT_DELAY_MILLIS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// WebSocket URL of the broker's STOMP endpoint
    pub url: String,
    /// Heart-beat offered in the CONNECT frame
    pub heart_beat: HeartBeat,
    /// Zero disables reconnection
    pub reconnect_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            heart_beat: HeartBeat::new(DEFAULT_HEARTBEAT_MILLIS, DEFAULT_HEARTBEAT_MILLIS),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MILLIS),
        }
    }

    pub fn with_heart_beat(mut self, heart_beat: HeartBeat) -> Self {
        self.heart_beat = heart_beat;
        self
    }

    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }

    /// Delay before the next connection attempt, if reconnecting is enabled
    pub fn retry_delay(&self) -> Option<Duration> {
        (!self.reconnect_delay.is_zero()).then_some(self.reconnect_delay)
    }

    /// Value of the CONNECT frame's `host` header: the URL's authority
    pub fn stomp_host(&self) -> String {
        let without_scheme = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let authority = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = authority
            .rsplit_once('@')
            .map_or(authority, |(_, host)| host);

        if host.is_empty() {
            "localhost".to_string()
        } else {
            host.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_fixed_policy() {
        // テスト項目: デフォルト設定はハートビート 4000ms・再接続 5000ms
        // given (前提条件):

        // when (操作):
        let config = SessionConfig::default();

        // then (期待する結果):
        assert_eq!(config.url, "ws://127.0.0.1:8080/ws");
        assert_eq!(config.heart_beat, HeartBeat::new(4000, 4000));
        assert_eq!(config.retry_delay(), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn test_zero_reconnect_delay_disables_retry() {
        // テスト項目: 再接続遅延 0 は再接続なしを意味する
        // given (前提条件):
        let config = SessionConfig::default().with_reconnect_delay(Duration::ZERO);

        // when (操作):
        let delay = config.retry_delay();

        // then (期待する結果):
        assert_eq!(delay, None);
    }

    #[test]
    fn test_stomp_host_from_url() {
        // テスト項目: URL から host ヘッダ用の authority が取り出される
        // given (前提条件):
        let cases = [
            ("ws://127.0.0.1:8080/ws", "127.0.0.1:8080"),
            ("wss://user:pw@chat.example.com/ws?x=1", "chat.example.com"),
            ("ws:///ws", "localhost"),
        ];

        // when (操作) / then (期待する結果):
        for (url, expected) in cases {
            assert_eq!(SessionConfig::new(url).stomp_host(), expected);
        }
    }
}
