//! Line-oriented terminal front end: input parsing and event rendering.

use crate::session::{
    ChatMessage, ChatSession, Sender, ServerStatus, SessionEvent, SubmitRejected,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

pub const WELCOME: &str =
    "Hello! I'm your movie expert chatbot. Ask me anything about the movies in my database!";

pub const HELP: &str = "Commands: /retry reconnects to the server, /quit exits.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Say(String),
    Retry,
    Quit,
    Help,
}

pub fn parse_input(line: &str) -> Input {
    match line.trim() {
        "/quit" | "/exit" => Input::Quit,
        "/retry" => Input::Retry,
        "/help" => Input::Help,
        _ => Input::Say(line.to_string()),
    }
}

fn render_message(message: &ChatMessage) -> Option<String> {
    match (message.sender, message.is_error) {
        // Already on screen as typed.
        (Sender::User, _) => None,
        (Sender::Bot, false) => Some(format!("kino> {}", message.text)),
        (Sender::Bot, true) => Some(format!("kino! {}", message.text)),
    }
}

fn render_status(status: ServerStatus) -> String {
    match status {
        ServerStatus::Checking => "[checking server...]".to_string(),
        ServerStatus::Online => "[server online]".to_string(),
        ServerStatus::Offline => "[server offline: type /retry to reconnect]".to_string(),
    }
}

/// Line to print for `event`, if any.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Message(message) => render_message(message),
        SessionEvent::Status(status) => Some(render_status(*status)),
    }
}

pub fn render_rejection(rejected: SubmitRejected) -> Option<String> {
    match rejected {
        SubmitRejected::Empty => None,
        SubmitRejected::Busy => Some("[still waiting for the previous answer]".to_string()),
        SubmitRejected::Offline => Some(render_status(ServerStatus::Offline)),
    }
}

/// Read commands from `input` until EOF, `/quit` or `shutdown`.
///
/// Cancellation is observed while waiting for a line and while a chat or
/// reconnect request is in flight; an abandoned request is dropped.
pub async fn run<R>(
    session: &ChatSession,
    input: R,
    shutdown: &CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Retry => {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = session.retry_connection() => {}
                }
            }
            Input::Say(text) => {
                let submitted = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    submitted = session.submit(&text) => submitted,
                };
                if let Err(rejected) = submitted {
                    if let Some(notice) = render_rejection(rejected) {
                        println!("{}", notice);
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input(" /quit "), Input::Quit);
        assert_eq!(parse_input("/retry"), Input::Retry);
        assert_eq!(parse_input("/help"), Input::Help);
        assert_eq!(
            parse_input("Who directed Amélie?"),
            Input::Say("Who directed Amélie?".to_string())
        );
    }

    #[test]
    fn renders_bot_replies_and_errors() {
        let reply = SessionEvent::Message(ChatMessage::bot("Jean-Pierre Jeunet"));
        assert_eq!(render_event(&reply).as_deref(), Some("kino> Jean-Pierre Jeunet"));

        let error = SessionEvent::Message(ChatMessage::error("Too many requests."));
        assert_eq!(render_event(&error).as_deref(), Some("kino! Too many requests."));

        let user = SessionEvent::Message(ChatMessage::user("hi"));
        assert_eq!(render_event(&user), None);
    }

    #[test]
    fn offline_status_offers_retry() {
        let line = render_event(&SessionEvent::Status(ServerStatus::Offline)).unwrap();
        assert!(line.contains("/retry"));
    }
}
