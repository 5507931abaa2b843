//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! 接続順を保つため Vec をインメモリ DB として使用します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Destination, RepositoryError, Session, SessionId, SessionRepository, Subscriber,
    Subscription, SubscriptionId, Username,
};

/// インメモリ Session Repository 実装
#[derive(Default)]
pub struct InMemorySessionRepository {
    /// 接続中のセッション（接続順）
    sessions: Arc<Mutex<Vec<Session>>>,
}

impl InMemorySessionRepository {
    pub fn new(sessions: Arc<Mutex<Vec<Session>>>) -> Self {
        Self { sessions }
    }
}

fn not_found(session_id: &SessionId) -> RepositoryError {
    RepositoryError::SessionNotFound(session_id.as_str().to_string())
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn add_session(&self, session: Session) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.iter().any(|s| s.id == session.id) {
            return Err(RepositoryError::DuplicateSession(
                session.id.as_str().to_string(),
            ));
        }
        sessions.push(session);
        Ok(())
    }

    async fn remove_session(&self, session_id: &SessionId) -> Result<Session, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let index = sessions
            .iter()
            .position(|s| &s.id == session_id)
            .ok_or_else(|| not_found(session_id))?;
        Ok(sessions.remove(index))
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<Session, RepositoryError> {
        let sessions = self.sessions.lock().await;
        sessions
            .iter()
            .find(|s| &s.id == session_id)
            .cloned()
            .ok_or_else(|| not_found(session_id))
    }

    async fn bind_username(
        &self,
        session_id: &SessionId,
        username: Username,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| not_found(session_id))?;
        session.username = Some(username);
        Ok(())
    }

    async fn add_subscription(
        &self,
        session_id: &SessionId,
        subscription: Subscription,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| not_found(session_id))?;
        session.subscribe(subscription);
        Ok(())
    }

    async fn remove_subscription(
        &self,
        session_id: &SessionId,
        subscription_id: &SubscriptionId,
    ) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| not_found(session_id))?;
        Ok(session.unsubscribe(subscription_id))
    }

    async fn find_subscribers(&self, destination: &Destination) -> Vec<Subscriber> {
        let sessions = self.sessions.lock().await;
        sessions
            .iter()
            .flat_map(|s| s.subscribers_of(destination))
            .collect()
    }

    async fn find_user_subscribers(
        &self,
        username: &Username,
        destination: &Destination,
    ) -> Vec<Subscriber> {
        let sessions = self.sessions.lock().await;
        sessions
            .iter()
            .filter(|s| s.is_user(username))
            .flat_map(|s| s.subscribers_of(destination))
            .collect()
    }

    async fn count_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionIdFactory;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - セッションの追加・削除・取得
    // - 購読の追加・解除と配送先の検索
    // - ユーザー名によるユーザー宛て配送先の絞り込み
    // ========================================

    fn destination(value: &str) -> Destination {
        Destination::new(value.to_string()).unwrap()
    }

    fn subscription(id: &str, dest: &str) -> Subscription {
        Subscription::new(SubscriptionId::new(id.to_string()).unwrap(), destination(dest))
    }

    async fn add_session(repo: &InMemorySessionRepository, username: Option<&str>) -> SessionId {
        let id = SessionIdFactory::generate().unwrap();
        let username = username.map(|u| Username::new(u.to_string()).unwrap());
        repo.add_session(Session::new(id.clone(), username, 0))
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn test_add_and_remove_session() {
        // テスト項目: セッションを追加・削除でき、削除時にセッションが返る
        // given (前提条件):
        let repo = InMemorySessionRepository::default();
        let id = add_session(&repo, Some("alice")).await;

        // when (操作):
        let removed = repo.remove_session(&id).await;

        // then (期待する結果):
        assert_eq!(removed.unwrap().id, id);
        assert_eq!(repo.count_sessions().await, 0);
        assert_eq!(
            repo.remove_session(&id).await,
            Err(RepositoryError::SessionNotFound(id.as_str().to_string()))
        );
    }

    #[tokio::test]
    async fn test_add_duplicate_session_fails() {
        // テスト項目: 同じ ID のセッションは追加できない
        // given (前提条件):
        let repo = InMemorySessionRepository::default();
        let id = add_session(&repo, None).await;

        // when (操作):
        let result = repo.add_session(Session::new(id.clone(), None, 1)).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::DuplicateSession(id.as_str().to_string()))
        );
    }

    #[tokio::test]
    async fn test_find_subscribers_in_connection_order() {
        // テスト項目: 配送先はセッションの接続順に返される
        // given (前提条件):
        let repo = InMemorySessionRepository::default();
        let first = add_session(&repo, None).await;
        let second = add_session(&repo, None).await;
        repo.add_subscription(&second, subscription("s-b", "/topic/public"))
            .await
            .unwrap();
        repo.add_subscription(&first, subscription("s-a", "/topic/public"))
            .await
            .unwrap();
        repo.add_subscription(&first, subscription("s-c", "/topic/other"))
            .await
            .unwrap();

        // when (操作):
        let subscribers = repo.find_subscribers(&destination("/topic/public")).await;

        // then (期待する結果):
        let found: Vec<_> = subscribers
            .iter()
            .map(|s| (s.session_id.clone(), s.subscription_id.as_str().to_string()))
            .collect();
        assert_eq!(
            found,
            vec![(first, "s-a".to_string()), (second, "s-b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_find_user_subscribers_filters_by_username() {
        // テスト項目: ユーザー宛て配送先はユーザー名が一致するセッションに限られる
        // given (前提条件):
        let repo = InMemorySessionRepository::default();
        let alice = add_session(&repo, Some("alice")).await;
        let bob = add_session(&repo, None).await;
        for id in [&alice, &bob] {
            repo.add_subscription(id, subscription("sub-1", "/user/queue/notifications"))
                .await
                .unwrap();
        }
        repo.bind_username(&bob, Username::new("bob".to_string()).unwrap())
            .await
            .unwrap();

        // when (操作):
        let for_bob = repo
            .find_user_subscribers(
                &Username::new("bob".to_string()).unwrap(),
                &destination("/user/queue/notifications"),
            )
            .await;

        // then (期待する結果):
        assert_eq!(for_bob.len(), 1);
        assert_eq!(for_bob[0].session_id, bob);
    }

    #[tokio::test]
    async fn test_remove_subscription() {
        // テスト項目: 購読解除後はその宛先の配送先から外れる
        // given (前提条件):
        let repo = InMemorySessionRepository::default();
        let id = add_session(&repo, None).await;
        repo.add_subscription(&id, subscription("sub-0", "/topic/public"))
            .await
            .unwrap();

        // when (操作):
        let removed = repo
            .remove_subscription(&id, &SubscriptionId::new("sub-0".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert_eq!(removed, Ok(true));
        assert!(
            repo.find_subscribers(&destination("/topic/public"))
                .await
                .is_empty()
        );
    }
}
