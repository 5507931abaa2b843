//! MessagePusher trait 定義
//!
//! セッションへのフレーム送信を抽象化します。WebSocket の生成は UI 層、
//! 送信は Infrastructure 層の実装が担当します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, SessionId};

/// セッションへエンコード済みフレームを送るチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// セッションの送信チャンネルを登録
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel);

    /// セッションの送信チャンネルを登録解除
    async fn unregister_client(&self, session_id: &SessionId);

    /// 特定のセッションへ送信
    async fn push_to(&self, session_id: &SessionId, content: &str)
    -> Result<(), MessagePushError>;
}
