//! Input loop shutdown behaviour against a stubbed relay.

use chat_shell::{terminal, ChatSession, RelayClient, ServerStatus};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn slow_relay(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "message": "Server is running" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "reply": "Tim Robbins" }))
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

fn session_for(server: &MockServer) -> ChatSession {
    let client = RelayClient::new(
        &server.uri(),
        Duration::from_secs(2),
        Duration::from_secs(60),
    )
    .unwrap();
    ChatSession::new(client)
}

#[tokio::test]
async fn shutdown_interrupts_pending_chat() {
    let server = slow_relay(Duration::from_secs(30)).await;
    let session = session_for(&server);
    assert_eq!(session.check_status().await, ServerStatus::Online);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let input: &[u8] = b"Who starred in Shawshank?\n";
    let started = Instant::now();
    let finished = tokio::time::timeout(
        Duration::from_secs(5),
        terminal::run(&session, input, &shutdown),
    )
    .await;

    assert!(finished.is_ok(), "loop kept waiting on the chat request");
    finished.unwrap().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    // Cancelled before the relay answered.
    assert!(session.messages().iter().all(|m| m.text != "Tim Robbins"));
}

#[tokio::test]
async fn shutdown_interrupts_idle_prompt() {
    let server = slow_relay(Duration::ZERO).await;
    let session = session_for(&server);

    // Keep the writer alive so the reader never reaches EOF.
    let (_writer, reader) = tokio::io::duplex(64);
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let finished = tokio::time::timeout(
        Duration::from_secs(2),
        terminal::run(&session, BufReader::new(reader), &shutdown),
    )
    .await;

    assert!(finished.is_ok());
}

#[tokio::test]
async fn quit_command_ends_loop() {
    let server = slow_relay(Duration::ZERO).await;
    let session = session_for(&server);
    assert_eq!(session.check_status().await, ServerStatus::Online);

    let input: &[u8] = b"Who starred in Shawshank?\n/quit\nnever sent\n";
    terminal::run(&session, input, &CancellationToken::new())
        .await
        .unwrap();

    let texts: Vec<String> = session.messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["Who starred in Shawshank?", "Tim Robbins"]);
}
