//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    Destination, RepositoryError, Session, SessionId, Subscriber, Subscription, SubscriptionId,
    Username,
};

/// Session Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// セッションを追加
    async fn add_session(&self, session: Session) -> Result<(), RepositoryError>;

    /// セッションを削除し、削除したセッションを返す
    async fn remove_session(&self, session_id: &SessionId) -> Result<Session, RepositoryError>;

    /// セッションを取得
    async fn get_session(&self, session_id: &SessionId) -> Result<Session, RepositoryError>;

    /// セッションにユーザー名を設定
    async fn bind_username(
        &self,
        session_id: &SessionId,
        username: Username,
    ) -> Result<(), RepositoryError>;

    /// 購読を追加（同じ ID は置き換え）
    async fn add_subscription(
        &self,
        session_id: &SessionId,
        subscription: Subscription,
    ) -> Result<(), RepositoryError>;

    /// 購読を解除。解除した場合は true
    async fn remove_subscription(
        &self,
        session_id: &SessionId,
        subscription_id: &SubscriptionId,
    ) -> Result<bool, RepositoryError>;

    /// `destination` を購読している全ての配送先（セッション接続順）
    async fn find_subscribers(&self, destination: &Destination) -> Vec<Subscriber>;

    /// `username` のセッションのうち `destination` を購読している配送先
    async fn find_user_subscribers(
        &self,
        username: &Username,
        destination: &Destination,
    ) -> Vec<Subscriber>;

    /// 接続中のセッション数
    async fn count_sessions(&self) -> usize;
}
