//! End-to-end tests: real sessions against an in-process broker.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use hearth_client::{ChatSession, SessionConfig, SessionEvent};
use hearth_server::{
    config::ServerConfig,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository,
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, DeliverMessageUseCase, DisconnectSessionUseCase,
        RouteMessageUseCase, SendNotificationUseCase, SubscribeUseCase,
    },
};
use hearth_shared::{
    dto::{ChatMessage, MessageType, Notification, NotificationDraft, NotificationType},
    stomp::HeartBeat,
    time::SystemClock,
};
use tokio::{
    net::TcpListener,
    sync::{Mutex, broadcast},
    task::JoinHandle,
    time::timeout,
};

const WAIT: Duration = Duration::from_secs(5);

/// Broker bound to an ephemeral port; aborted on drop
struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let repository = Arc::new(InMemorySessionRepository::default());
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let clock = Arc::new(SystemClock);
        let deliver = Arc::new(DeliverMessageUseCase::new(
            repository.clone(),
            pusher.clone(),
        ));
        let send_notification = Arc::new(SendNotificationUseCase::new(
            deliver.clone(),
            clock.clone(),
        ));
        let server = Server::new(
            ServerConfig {
                heart_beat: HeartBeat::new(0, 0),
                ..ServerConfig::default()
            },
            Arc::new(ConnectSessionUseCase::new(
                repository.clone(),
                pusher.clone(),
                clock.clone(),
            )),
            Arc::new(SubscribeUseCase::new(repository.clone())),
            Arc::new(RouteMessageUseCase::new(
                repository.clone(),
                deliver.clone(),
                send_notification.clone(),
                clock.clone(),
            )),
            send_notification,
            Arc::new(DisconnectSessionUseCase::new(
                repository, pusher, deliver, clock,
            )),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            if let Err(e) = server.serve(listener).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Self { addr, task }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A connected session and its event stream
struct Participant {
    session: ChatSession,
    events: broadcast::Receiver<SessionEvent>,
}

impl Participant {
    /// Connect as `user_id` and wait until the broker echoes our own JOIN,
    /// which means every subscription is registered.
    async fn join(server: &TestServer, user_id: &str) -> Self {
        let config = SessionConfig::new(server.ws_url())
            .with_heart_beat(HeartBeat::new(0, 0))
            .with_reconnect_delay(Duration::ZERO);
        let mut session = ChatSession::new(config);
        let events = session.subscribe();
        session.connect(user_id).await.unwrap();

        let mut participant = Self { session, events };
        participant
            .wait_for(|e| matches!(e, SessionEvent::Connected { .. }))
            .await;
        participant.wait_for_chat(MessageType::Join, user_id).await;
        participant
    }

    async fn wait_for(&mut self, predicate: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        loop {
            let event = timeout(WAIT, self.events.recv())
                .await
                .expect("no session event")
                .expect("event channel closed");
            if predicate(&event) {
                return event;
            }
        }
    }

    async fn wait_for_chat(&mut self, r#type: MessageType, sender: &str) -> ChatMessage {
        let event = self
            .wait_for(|e| {
                matches!(e, SessionEvent::MessageReceived(m) if m.r#type == r#type && m.sender == sender)
            })
            .await;
        match event {
            SessionEvent::MessageReceived(message) => message,
            other => panic!("unexpected event: {:?}", other),
        }
    }

    async fn wait_for_notification(&mut self, title: &str) -> Notification {
        let event = self
            .wait_for(|e| matches!(e, SessionEvent::NotificationReceived(n) if n.title == title))
            .await;
        match event {
            SessionEvent::NotificationReceived(notification) => notification,
            other => panic!("unexpected event: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_join_chat_and_leave_between_two_users() {
    // テスト項目: 2 人のユーザー間で JOIN・CHAT・LEAVE がブローカー経由で届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = Participant::join(&server, "alice").await;
    let mut bob = Participant::join(&server, "bob").await;

    // when (操作):
    let bob_joined = alice.wait_for_chat(MessageType::Join, "bob").await;
    bob.session.send_message("hello alice").await;
    let received_by_alice = alice.wait_for_chat(MessageType::Chat, "bob").await;
    let echoed_to_bob = bob.wait_for_chat(MessageType::Chat, "bob").await;
    bob.session.disconnect().await;
    let bob_left = alice.wait_for_chat(MessageType::Leave, "bob").await;

    // then (期待する結果):
    assert_eq!(bob_joined.content, "bob joined the chat!");
    assert_eq!(received_by_alice.content, "hello alice");
    assert!(received_by_alice.timestamp > 0);
    assert_eq!(echoed_to_bob, received_by_alice);
    assert_eq!(bob_left.content, "bob left the chat!");

    let messages = alice.session.messages().await;
    assert_eq!(messages.first(), Some(&ChatMessage::join("alice", messages[0].timestamp)));
    assert!(messages.contains(&received_by_alice));
    assert!(messages.contains(&bob_left));
    assert!(!bob.session.is_connected().await);
}

#[tokio::test]
async fn test_notification_over_stomp_is_broadcast() {
    // テスト項目: STOMP で送った通知が全員の /topic/notifications に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = Participant::join(&server, "alice").await;
    let mut bob = Participant::join(&server, "bob").await;

    // when (操作):
    alice
        .session
        .send_notification(NotificationDraft::new(
            "deploy",
            "v2 is live",
            NotificationType::Success,
            "bob",
        ))
        .await;
    let to_bob = bob.wait_for_notification("deploy").await;
    let to_alice = alice.wait_for_notification("deploy").await;

    // then (期待する結果):
    assert_eq!(to_bob.message, "v2 is live");
    assert_eq!(to_bob.r#type, NotificationType::Success);
    assert_eq!(to_bob, to_alice);
    assert_eq!(bob.session.notifications().await, vec![to_bob]);
}

#[tokio::test]
async fn test_rest_notification_reaches_only_the_recipient() {
    // テスト項目: REST API の送信通知は宛先ユーザーの /user/queue/notifications にだけ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = Participant::join(&server, "alice").await;
    let mut bob = Participant::join(&server, "bob").await;
    let http = reqwest::Client::new();

    // when (操作):
    let response = http
        .post(server.http_url("/api/notifications/send"))
        .json(&NotificationDraft::new(
            "ping",
            "for alice",
            NotificationType::Info,
            "alice",
        ))
        .send()
        .await
        .unwrap();
    let status = response.status();
    let returned: Notification = response.json().await.unwrap();
    let to_alice = alice.wait_for_notification("ping").await;

    // a broadcast afterwards is the first notification bob sees
    http.post(server.http_url("/api/notifications/broadcast"))
        .json(&NotificationDraft::new(
            "all",
            "for everyone",
            NotificationType::Warning,
            "everyone",
        ))
        .send()
        .await
        .unwrap();
    let first_for_bob = bob
        .wait_for(|e| matches!(e, SessionEvent::NotificationReceived(_)))
        .await;

    // then (期待する結果):
    assert!(status.is_success());
    assert_eq!(to_alice, returned);
    assert_eq!(to_alice.recipient, "alice");
    match first_for_bob {
        SessionEvent::NotificationReceived(notification) => {
            assert_eq!(notification.title, "all")
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_rest_rejects_blank_recipient_and_reports_health() {
    // テスト項目: 宛先が空の通知は 400 になり、ヘルスチェックは ok を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let http = reqwest::Client::new();

    // when (操作):
    let rejected = http
        .post(server.http_url("/api/notifications/send"))
        .json(&NotificationDraft::new("t", "m", NotificationType::Error, "  "))
        .send()
        .await
        .unwrap();
    let health: serde_json::Value = http
        .get(server.http_url("/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(rejected.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_connection_refused_without_retry_stops_session() {
    // テスト項目: 接続できず再接続も無効な場合、セッションは停止を通知する
    // given (前提条件):
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = SessionConfig::new(format!("ws://{}/ws", addr))
        .with_reconnect_delay(Duration::ZERO);
    let mut session = ChatSession::new(config);
    let mut events = session.subscribe();

    // when (操作):
    session.connect("alice").await.unwrap();
    let mut seen = Vec::new();
    loop {
        let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
        let done = event == SessionEvent::Disconnected;
        seen.push(event);
        if done {
            break;
        }
    }

    // then (期待する結果):
    assert!(seen.contains(&SessionEvent::ConnectionLost { retry_in: None }));
    assert!(!session.is_connected().await);
}
