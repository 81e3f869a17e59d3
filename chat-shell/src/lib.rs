pub mod client;
pub mod config;
pub mod liveness;
pub mod session;
pub mod terminal;

pub use client::{RelayClient, ShellError};
pub use liveness::LivenessProbe;
pub use session::{ChatMessage, ChatSession, Sender, ServerStatus, SessionEvent, SubmitRejected};
