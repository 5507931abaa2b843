//! Heart-beat header handling.

use std::time::Duration;

use super::StompError;

/// A heart-beat is a bare end-of-line between frames
pub const HEARTBEAT_EOL: &str = "\n";

/// The `heart-beat` header value: `outgoing,incoming` in milliseconds.
///
/// Zero means "cannot send" / "does not want to receive".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartBeat {
    pub outgoing: u64,
    pub incoming: u64,
}

/// Effective heart-beat periods for one side of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Negotiated {
    /// How often this side must send something
    pub send_every: Option<Duration>,
    /// How often this side expects to hear from the peer
    pub expect_every: Option<Duration>,
}

impl HeartBeat {
    pub fn new(outgoing: u64, incoming: u64) -> Self {
        Self { outgoing, incoming }
    }

    pub fn parse(value: &str) -> Result<Self, StompError> {
        let invalid = || StompError::InvalidHeartBeat(value.to_string());
        let (outgoing, incoming) = value.split_once(',').ok_or_else(invalid)?;
        let outgoing = outgoing.trim().parse().map_err(|_| invalid())?;
        let incoming = incoming.trim().parse().map_err(|_| invalid())?;
        Ok(Self { outgoing, incoming })
    }

    pub fn to_header(&self) -> String {
        format!("{},{}", self.outgoing, self.incoming)
    }

    /// Combine our settings with the peer's header.
    ///
    /// A direction is enabled only when both sides agree to it, and then runs
    /// at the slower of the two requested rates.
    pub fn negotiate(&self, remote: &HeartBeat) -> Negotiated {
        Negotiated {
            send_every: agreed(self.outgoing, remote.incoming),
            expect_every: agreed(self.incoming, remote.outgoing),
        }
    }
}

fn agreed(local: u64, remote: u64) -> Option<Duration> {
    if local == 0 || remote == 0 {
        None
    } else {
        Some(Duration::from_millis(local.max(remote)))
    }
}

impl Negotiated {
    /// Silence after which the peer is considered gone
    pub fn read_timeout(&self) -> Option<Duration> {
        self.expect_every.map(|period| period * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_heart_beat_header() {
        // テスト項目: heart-beat ヘッダが送信・受信間隔として解釈される
        // given (前提条件):
        let value = "4000, 10000";

        // when (操作):
        let result = HeartBeat::parse(value);

        // then (期待する結果):
        assert_eq!(result, Ok(HeartBeat::new(4000, 10000)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        // テスト項目: 不正な heart-beat ヘッダはエラーになる
        // given (前提条件):
        let values = ["4000", "a,b", "-1,0"];

        // when (操作) / then (期待する結果):
        for value in values {
            assert!(matches!(
                HeartBeat::parse(value),
                Err(StompError::InvalidHeartBeat(_))
            ));
        }
    }

    #[test]
    fn test_negotiate_uses_slower_rate() {
        // テスト項目: 双方が有効な場合は遅い方の間隔が採用される
        // given (前提条件):
        let client = HeartBeat::new(4000, 4000);
        let broker = HeartBeat::new(10000, 10000);

        // when (操作):
        let negotiated = client.negotiate(&broker);

        // then (期待する結果):
        assert_eq!(negotiated.send_every, Some(Duration::from_millis(10000)));
        assert_eq!(negotiated.expect_every, Some(Duration::from_millis(10000)));
        assert_eq!(negotiated.read_timeout(), Some(Duration::from_millis(20000)));
    }

    #[test]
    fn test_negotiate_zero_disables_direction() {
        // テスト項目: どちらかが 0 の方向はハートビートが無効になる
        // given (前提条件):
        let client = HeartBeat::new(4000, 4000);
        let broker = HeartBeat::new(0, 5000);

        // when (操作):
        let negotiated = client.negotiate(&broker);

        // then (期待する結果):
        assert_eq!(negotiated.send_every, Some(Duration::from_millis(5000)));
        assert_eq!(negotiated.expect_every, None);
        assert_eq!(negotiated.read_timeout(), None);
    }
}
