//! エンティティ

use super::{Destination, SessionId, SubscriptionId, Username};

/// 1 つの購読（SUBSCRIBE フレームに対応）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub destination: Destination,
}

impl Subscription {
    pub fn new(id: SubscriptionId, destination: Destination) -> Self {
        Self { id, destination }
    }
}

/// 配送先: どのセッションのどの購読に MESSAGE を届けるか
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub session_id: SessionId,
    pub subscription_id: SubscriptionId,
    /// 購読時の宛先（MESSAGE の `destination` ヘッダに使う）
    pub destination: Destination,
}

/// STOMP セッション
///
/// CONNECTED を返した時点で作成され、WebSocket の切断で削除されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub username: Option<Username>,
    /// 接続時刻（Unix ミリ秒）
    pub connected_at: i64,
    pub subscriptions: Vec<Subscription>,
}

impl Session {
    pub fn new(id: SessionId, username: Option<Username>, connected_at: i64) -> Self {
        Self {
            id,
            username,
            connected_at,
            subscriptions: Vec::new(),
        }
    }

    /// 購読を追加する。同じ ID の購読は置き換える
    pub fn subscribe(&mut self, subscription: Subscription) {
        self.subscriptions.retain(|s| s.id != subscription.id);
        self.subscriptions.push(subscription);
    }

    /// 購読を解除する。解除した場合は true
    pub fn unsubscribe(&mut self, id: &SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| &s.id != id);
        self.subscriptions.len() != before
    }

    /// `destination` を購読している配送先
    pub fn subscribers_of(&self, destination: &Destination) -> Vec<Subscriber> {
        self.subscriptions
            .iter()
            .filter(|s| &s.destination == destination)
            .map(|s| Subscriber {
                session_id: self.id.clone(),
                subscription_id: s.id.clone(),
                destination: s.destination.clone(),
            })
            .collect()
    }

    pub fn is_user(&self, username: &Username) -> bool {
        self.username.as_ref() == Some(username)
    }
}
