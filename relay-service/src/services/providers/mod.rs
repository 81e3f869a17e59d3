//! Inference provider abstraction.
//!
//! The relay talks to exactly one hosted model, picked by configuration. The
//! trait exists so the HTTP layer can be exercised against [`mock::MockProvider`].

pub mod huggingface;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use huggingface::HuggingFaceProvider;
pub use mock::MockProvider;

/// Error type for provider operations.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// No response was received (connect failure, timeout, broken body).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The hosted model is cold and still being loaded.
    #[error("Model loading: {message}")]
    ModelLoading {
        message: String,
        estimated_time: Option<f64>,
    },

    #[error("Rate limited")]
    RateLimited { retry_after: Option<u64> },

    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: Value },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::NetworkError(_) => "network",
            ProviderError::ModelLoading { .. } => "model_loading",
            ProviderError::RateLimited { .. } => "rate_limited",
            ProviderError::ApiError { .. } => "api_error",
            ProviderError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// A hosted text-generation model.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw generated text, prompt echo included.
    ///
    /// `request_id` is the id of the inbound request this call serves.
    async fn generate(
        &self,
        prompt: &str,
        request_id: Option<&str>,
    ) -> Result<String, ProviderError>;
}
