//! Session behaviour against a stubbed relay.

use chat_shell::client::{CONNECTIVITY_MESSAGE, RATE_LIMITED_MESSAGE};
use chat_shell::session::OFFLINE_MESSAGE;
use chat_shell::{
    ChatMessage, ChatSession, LivenessProbe, RelayClient, ServerStatus, SessionEvent,
    SubmitRejected,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: &str) -> RelayClient {
    RelayClient::new(base_url, Duration::from_secs(2), Duration::from_secs(5)).unwrap()
}

/// URL of a port nothing listens on.
fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn mount_ping(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(json!({ "status": "ok", "message": "Server is running" })),
        )
        .mount(server)
        .await;
}

fn offline_notices(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .filter(|m| m.is_error && m.text == OFFLINE_MESSAGE)
        .count()
}

#[tokio::test]
async fn starts_in_checking_state() {
    let session = ChatSession::new(client_for(&dead_url()));
    assert_eq!(session.status(), ServerStatus::Checking);
    assert!(session.messages().is_empty());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn successful_probe_goes_online() {
    let server = MockServer::start().await;
    mount_ping(&server, 200).await;

    let session = ChatSession::new(client_for(&server.uri()));
    assert_eq!(session.check_status().await, ServerStatus::Online);
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn repeated_probe_failures_add_one_offline_notice() {
    let session = ChatSession::new(client_for(&dead_url()));

    assert_eq!(session.check_status().await, ServerStatus::Offline);
    assert_eq!(session.check_status().await, ServerStatus::Offline);
    assert_eq!(session.check_status().await, ServerStatus::Offline);

    assert_eq!(offline_notices(&session.messages()), 1);
}

#[tokio::test]
async fn online_session_goes_offline_when_probe_fails() {
    let server = MockServer::start().await;
    mount_ping(&server, 200).await;

    let (session, mut events) = ChatSession::with_events(client_for(&server.uri()));
    assert_eq!(session.check_status().await, ServerStatus::Online);
    assert_eq!(
        events.recv().await,
        Some(SessionEvent::Status(ServerStatus::Online))
    );

    server.reset().await;
    mount_ping(&server, 500).await;

    assert_eq!(session.check_status().await, ServerStatus::Offline);
    assert_eq!(
        events.recv().await,
        Some(SessionEvent::Status(ServerStatus::Offline))
    );
    assert_eq!(
        events.recv().await,
        Some(SessionEvent::Message(ChatMessage::error(OFFLINE_MESSAGE)))
    );
    assert_eq!(offline_notices(&session.messages()), 1);
}

#[tokio::test]
async fn retry_connection_recovers() {
    let server = MockServer::start().await;
    mount_ping(&server, 503).await;

    let session = ChatSession::new(client_for(&server.uri()));
    assert_eq!(session.check_status().await, ServerStatus::Offline);
    assert!(!session.can_submit("hello"));

    server.reset().await;
    mount_ping(&server, 200).await;

    assert_eq!(session.retry_connection().await, ServerStatus::Online);
    assert!(session.can_submit("hello"));
}

#[tokio::test]
async fn submit_appends_question_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "Who directed Heat?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Michael Mann" })))
        .expect(1)
        .mount(&server)
        .await;

    let session = ChatSession::new(client_for(&server.uri()));
    let reply = session.submit("Who directed Heat?").await.unwrap();

    assert_eq!(reply, ChatMessage::bot("Michael Mann"));
    assert_eq!(
        session.messages(),
        vec![
            ChatMessage::user("Who directed Heat?"),
            ChatMessage::bot("Michael Mann")
        ]
    );
    assert!(!session.is_loading());
}

#[tokio::test]
async fn relay_error_text_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "The AI model is currently loading. Please try again in a few moments.",
            "details": "Model google/flan-t5-base is currently loading"
        })))
        .mount(&server)
        .await;

    let session = ChatSession::new(client_for(&server.uri()));
    let reply = session.submit("Any thrillers?").await.unwrap();

    assert!(reply.is_error);
    assert_eq!(
        reply.text,
        "The AI model is currently loading. Please try again in a few moments."
    );
}

#[tokio::test]
async fn bare_429_maps_to_rate_limit_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let session = ChatSession::new(client_for(&server.uri()));
    let reply = session.submit("Any thrillers?").await.unwrap();

    assert_eq!(reply, ChatMessage::error(RATE_LIMITED_MESSAGE));
    assert_ne!(session.status(), ServerStatus::Offline);
}

#[tokio::test]
async fn connectivity_failure_marks_offline_and_blocks_input() {
    let session = ChatSession::new(client_for(&dead_url()));

    let reply = session.submit("Anyone there?").await.unwrap();
    assert_eq!(reply, ChatMessage::error(CONNECTIVITY_MESSAGE));
    assert_eq!(session.status(), ServerStatus::Offline);

    assert_eq!(
        session.submit("Hello?").await,
        Err(SubmitRejected::Offline)
    );
}

#[tokio::test]
async fn blank_input_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let session = ChatSession::new(client_for(&server.uri()));
    assert_eq!(session.submit("   ").await, Err(SubmitRejected::Empty));
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn second_submit_waits_for_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({ "reply": "slow answer" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(ChatSession::new(client_for(&server.uri())));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit("first").await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.is_loading());
    assert_eq!(session.submit("second").await, Err(SubmitRejected::Busy));

    let reply = first.await.unwrap().unwrap();
    assert_eq!(reply.text, "slow answer");
    assert!(!session.is_loading());
}

#[tokio::test]
async fn liveness_probe_runs_until_stopped() {
    let server = MockServer::start().await;
    mount_ping(&server, 200).await;

    let session = Arc::new(ChatSession::new(client_for(&server.uri())));
    let probe = LivenessProbe::spawn(session.clone(), Duration::from_millis(50));
    assert!(probe.is_running());

    tokio::time::sleep(Duration::from_millis(220)).await;
    probe.stop().await;

    assert_eq!(session.status(), ServerStatus::Online);

    let probes = server.received_requests().await.unwrap().len();
    assert!(probes >= 2, "expected repeated probes, got {probes}");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), probes);
}

#[tokio::test]
async fn dropping_the_probe_cancels_it() {
    let server = MockServer::start().await;
    mount_ping(&server, 200).await;

    let session = Arc::new(ChatSession::new(client_for(&server.uri())));
    let probe = LivenessProbe::spawn(session.clone(), Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(80)).await;
    drop(probe);

    // Let any in-flight probe settle.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let probes = server.received_requests().await.unwrap().len();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), probes);
    assert_eq!(Arc::strong_count(&session), 1);
}
