//! Value objects used by the client session.

use std::fmt;

use crate::error::ClientError;

/// Identity the session chats under; becomes the `sender` of outgoing messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID, rejecting empty or whitespace-only values.
    ///
    /// The value is kept as given so that `sender` matches what was passed to
    /// `connect`.
    pub fn new(value: impl Into<String>) -> Result<Self, ClientError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ClientError::InvalidUserId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_accepts_non_empty_value() {
        // テスト項目: 空でない文字列はユーザー ID として受け付けられる
        // given (前提条件):
        let value = "alice".to_string();

        // when (操作):
        let result = UserId::try_from(value);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_user_id_rejects_blank_value() {
        // テスト項目: 空文字列・空白のみの文字列は拒否される
        // given (前提条件):
        let values = ["", "   "];

        // when (操作) / then (期待する結果):
        for value in values {
            assert_eq!(
                UserId::new(value),
                Err(ClientError::InvalidUserId(value.to_string()))
            );
        }
    }
}
