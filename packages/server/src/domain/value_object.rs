//! 値オブジェクト
//!
//! 生成時にバリデーションを行い、不正な値がドメイン層に入らないようにします。

use std::fmt;

use hearth_shared::destination::{APP_PREFIX, USER_PREFIX};
use uuid::Uuid;

use super::ValueObjectError;

/// STOMP セッション（WebSocket 接続）の ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty("session id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SessionId の生成（UUID v4）
pub struct SessionIdFactory;

impl SessionIdFactory {
    pub fn generate() -> Result<SessionId, ValueObjectError> {
        SessionId::new(Uuid::new_v4().to_string())
    }
}

/// セッションに紐づくユーザー名
///
/// CONNECT の `login` ヘッダ、または `/app/chat.addUser` の sender で設定され、
/// ユーザー宛て宛先（`/user/...`）の解決に使われます。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("username"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SUBSCRIBE フレームの `id`（セッション内で一意）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty("subscription id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// STOMP の宛先
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination(String);

impl Destination {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if !value.starts_with('/') || value.chars().any(char::is_control) {
            return Err(ValueObjectError::InvalidDestination(value));
        }
        Ok(Self(value))
    }

    /// コード中の定数宛先（`hearth_shared::destination`）用
    pub fn from_static(value: &'static str) -> Self {
        debug_assert!(value.starts_with('/'));
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// アプリケーション（`/app/...`）宛てか
    pub fn is_application(&self) -> bool {
        has_prefix(&self.0, APP_PREFIX)
    }

    /// ユーザー宛て宛先をクライアントが購読する形に変換
    /// （`/queue/notifications` -> `/user/queue/notifications`）
    pub fn for_user(&self) -> Destination {
        Destination(format!("{}{}", USER_PREFIX, self.0))
    }
}

impl TryFrom<String> for Destination {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `prefix` そのもの、または `prefix/` で始まるか
fn has_prefix(value: &str, prefix: &str) -> bool {
    value
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_factory_generates_unique_ids() {
        // テスト項目: SessionIdFactory は毎回異なる ID を生成する
        // given (前提条件):

        // when (操作):
        let first = SessionIdFactory::generate().unwrap();
        let second = SessionIdFactory::generate().unwrap();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }

    #[test]
    fn test_username_rejects_blank() {
        // テスト項目: 空白のみのユーザー名は生成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = Username::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::Empty("username")));
    }

    #[test]
    fn test_destination_validation() {
        // テスト項目: 宛先は '/' で始まり制御文字を含まない
        // given (前提条件):
        let valid = "/topic/public".to_string();
        let relative = "topic/public".to_string();
        let with_newline = "/topic/pub\nlic".to_string();

        // when (操作) / then (期待する結果):
        assert!(Destination::new(valid).is_ok());
        assert!(matches!(
            Destination::new(relative),
            Err(ValueObjectError::InvalidDestination(_))
        ));
        assert!(matches!(
            Destination::new(with_newline),
            Err(ValueObjectError::InvalidDestination(_))
        ));
    }

    #[test]
    fn test_application_prefix_matches_whole_segment() {
        // テスト項目: /app 判定はセグメント単位で行われる
        // given (前提条件):
        let app = Destination::new("/app/chat.sendMessage".to_string()).unwrap();
        let apple = Destination::new("/apple/pie".to_string()).unwrap();

        // when (操作) / then (期待する結果):
        assert!(app.is_application());
        assert!(!apple.is_application());
    }

    #[test]
    fn test_for_user_prefixes_destination() {
        // テスト項目: ユーザー宛て宛先に /user が前置される
        // given (前提条件):
        let queue = Destination::new("/queue/notifications".to_string()).unwrap();

        // when (操作):
        let subscribed = queue.for_user();

        // then (期待する結果):
        assert_eq!(subscribed.as_str(), "/user/queue/notifications");
    }
}
