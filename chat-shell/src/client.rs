//! HTTP client for the relay's `/api/ping` and `/api/chat` endpoints.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::time::Duration;
use thiserror::Error;

pub const MODEL_LOADING_MESSAGE: &str =
    "The AI model is currently loading. Please try again in a few moments.";
pub const RATE_LIMITED_MESSAGE: &str =
    "Too many requests. Please wait a moment before trying again.";
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again later.";
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not connect to the server. Please check your internet connection and try again.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Error)]
pub enum ShellError {
    /// The relay answered with a non-success status.
    #[error("relay returned {status}")]
    Relay { status: u16, error: Option<String> },

    /// No response came back: refused, reset or timed out.
    #[error("no response from relay: {0}")]
    Connectivity(String),

    #[error("invalid response from relay: {0}")]
    InvalidResponse(String),

    #[error("could not build request: {0}")]
    Request(String),
}

impl ShellError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ShellError::Connectivity(_))
    }

    /// Text shown to the user in place of a reply.
    pub fn user_message(&self) -> String {
        match self {
            ShellError::Relay {
                error: Some(error), ..
            } => error.clone(),
            ShellError::Relay { status: 503, .. } => MODEL_LOADING_MESSAGE.to_string(),
            ShellError::Relay { status: 429, .. } => RATE_LIMITED_MESSAGE.to_string(),
            ShellError::Relay { .. } | ShellError::InvalidResponse(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            ShellError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
            ShellError::Request(_) => UNEXPECTED_MESSAGE.to_string(),
        }
    }
}

fn transport_error(err: reqwest::Error) -> ShellError {
    if err.is_builder() {
        ShellError::Request(err.to_string())
    } else {
        ShellError::Connectivity(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

pub struct RelayClient {
    client: Client,
    base_url: String,
    ping_timeout: Duration,
    chat_timeout: Duration,
}

impl RelayClient {
    pub fn new(
        base_url: &str,
        ping_timeout: Duration,
        chat_timeout: Duration,
    ) -> Result<Self, ShellError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ShellError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            ping_timeout,
            chat_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lightweight liveness check.
    pub async fn ping(&self) -> Result<(), ShellError> {
        let url = format!("{}/api/ping", self.base_url);

        let response = self
            .client
            .traced_get(&url)
            .timeout(self.ping_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ShellError::Relay {
                status: status.as_u16(),
                error: None,
            })
        }
    }

    /// Ask one question and return the relay's reply text.
    pub async fn chat(&self, message: &str) -> Result<String, ShellError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .traced_post(&url)
            .json(&ChatRequest { message })
            .timeout(self.chat_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(relay_error(status, &body));
        }

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| ShellError::InvalidResponse(e.to_string()))?;

        Ok(reply.reply)
    }
}

fn relay_error(status: StatusCode, body: &str) -> ShellError {
    let error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .filter(|e| !e.is_empty());

    ShellError::Relay {
        status: status.as_u16(),
        error,
    }
}
