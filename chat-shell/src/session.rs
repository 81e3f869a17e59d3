//! In-memory chat session: message history, relay status and input gating.

use crate::client::RelayClient;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

pub const OFFLINE_MESSAGE: &str = "The server appears to be offline or not responding. Please check your connection and try again.";

/// Substring identifying the offline notice among error messages.
const OFFLINE_MARKER: &str = "server appears to be offline";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            is_error: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            is_error: true,
        }
    }

    fn is_offline_notice(&self) -> bool {
        self.is_error && self.text.contains(OFFLINE_MARKER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Checking,
    Online,
    Offline,
}

/// State changes pushed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Message(ChatMessage),
    Status(ServerStatus),
}

/// Why a submission was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("nothing to send")]
    Empty,
    #[error("a request is already in flight")]
    Busy,
    #[error("the server is offline")]
    Offline,
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<ChatMessage>,
    status: ServerStatus,
    loading: bool,
}

pub struct ChatSession {
    client: RelayClient,
    state: Mutex<SessionState>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl ChatSession {
    pub fn new(client: RelayClient) -> Self {
        Self {
            client,
            state: Mutex::new(SessionState {
                messages: Vec::new(),
                status: ServerStatus::Checking,
                loading: false,
            }),
            events: None,
        }
    }

    /// Session plus a receiver of every message and status change.
    pub fn with_events(client: RelayClient) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = Self::new(client);
        session.events = Some(tx);
        (session, rx)
    }

    // Never held across an await.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            // The renderer may already be gone during teardown.
            let _ = tx.send(event);
        }
    }

    fn push(&self, state: &mut SessionState, message: ChatMessage) {
        state.messages.push(message.clone());
        self.emit(SessionEvent::Message(message));
    }

    fn set_status(&self, state: &mut SessionState, status: ServerStatus) {
        if state.status != status {
            state.status = status;
            self.emit(SessionEvent::Status(status));
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn status(&self) -> ServerStatus {
        self.lock().status
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Whether `input` would be sent right now.
    pub fn can_submit(&self, input: &str) -> bool {
        let state = self.lock();
        !input.trim().is_empty() && !state.loading && state.status != ServerStatus::Offline
    }

    /// Send `input` to the relay and append the reply, or the mapped error, to
    /// the history. Returns the appended bot message.
    pub async fn submit(&self, input: &str) -> Result<ChatMessage, SubmitRejected> {
        {
            let mut state = self.lock();
            if input.trim().is_empty() {
                return Err(SubmitRejected::Empty);
            }
            if state.loading {
                return Err(SubmitRejected::Busy);
            }
            if state.status == ServerStatus::Offline {
                return Err(SubmitRejected::Offline);
            }

            state.loading = true;
            self.push(&mut state, ChatMessage::user(input));
        }

        let result = self.client.chat(input).await;

        let mut state = self.lock();
        let reply = match result {
            Ok(text) => ChatMessage::bot(text),
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                if e.is_connectivity() {
                    self.set_status(&mut state, ServerStatus::Offline);
                }
                ChatMessage::error(e.user_message())
            }
        };
        self.push(&mut state, reply.clone());
        state.loading = false;

        Ok(reply)
    }

    /// Probe the relay once and update the status.
    ///
    /// A failed probe appends the offline notice unless one is already in the
    /// history, so repeated failures do not stack up messages.
    pub async fn check_status(&self) -> ServerStatus {
        let result = self.client.ping().await;

        let mut state = self.lock();
        match result {
            Ok(()) => self.set_status(&mut state, ServerStatus::Online),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    url = %self.client.base_url(),
                    "Server status check failed"
                );
                self.set_status(&mut state, ServerStatus::Offline);

                if !state.messages.iter().any(ChatMessage::is_offline_notice) {
                    self.push(&mut state, ChatMessage::error(OFFLINE_MESSAGE));
                }
            }
        }

        state.status
    }

    /// Manual retry: back to `Checking`, then probe once.
    pub async fn retry_connection(&self) -> ServerStatus {
        {
            let mut state = self.lock();
            self.set_status(&mut state, ServerStatus::Checking);
        }
        self.check_status().await
    }
}
