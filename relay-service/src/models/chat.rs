use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/chat`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub message: String,
}
