//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// セッション接続のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 購読・購読解除のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscribeError {
    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 配送のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliverError {
    #[error("Failed to serialize payload: {0}")]
    Serialize(String),
}

/// 通知送信のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(ValueObjectError),

    #[error(transparent)]
    Deliver(#[from] DeliverError),
}

/// SEND フレームのルーティングのエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown application destination: {0}")]
    UnknownDestination(String),

    #[error(transparent)]
    InvalidDestination(ValueObjectError),

    #[error("invalid payload for {destination}: {reason}")]
    InvalidPayload { destination: String, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Deliver(#[from] DeliverError),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// セッション切断のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisconnectError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Deliver(#[from] DeliverError),
}
