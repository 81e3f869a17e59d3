//! Hugging Face Inference API provider.
//!
//! Request: `POST <endpoint>` with `{"inputs": "<prompt>"}`.
//! Response: `[{"generated_text": "..."}]`, or `{"error": "...", "estimated_time": 20.0}`
//! while the model is cold.

use super::{InferenceProvider, ProviderError};
use crate::config::InferenceConfig;
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::observability::TracedClientExt;

/// Marker the Inference API uses in its cold-start error message.
const LOADING_MARKER: &str = "currently loading";

pub struct HuggingFaceProvider {
    config: InferenceConfig,
    client: Client,
}

impl HuggingFaceProvider {
    pub fn new(config: InferenceConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl InferenceProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(
        &self,
        prompt: &str,
        request_id: Option<&str>,
    ) -> Result<String, ProviderError> {
        tracing::debug!(
            endpoint = %self.config.endpoint,
            prompt_len = prompt.len(),
            "Sending request to inference endpoint"
        );

        let mut request = self
            .client
            .traced_post(&self.config.endpoint)
            .request_id(request_id)
            .json(&GenerateRequest { inputs: prompt });

        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, retry_after, &text));
        }

        parse_generated_text(&text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

/// Cold-start error carried in an `{"error": ...}` payload, whatever the status.
fn loading_error(body: &Value) -> Option<ProviderError> {
    let message = body.get("error")?.as_str()?;
    if !message.to_ascii_lowercase().contains(LOADING_MARKER) {
        return None;
    }

    Some(ProviderError::ModelLoading {
        message: message.to_string(),
        estimated_time: body.get("estimated_time").and_then(Value::as_f64),
    })
}

fn classify_failure(status: StatusCode, retry_after: Option<u64>, text: &str) -> ProviderError {
    let body = serde_json::from_str::<Value>(text).unwrap_or_else(|_| Value::String(text.to_string()));

    if let Some(err) = loading_error(&body) {
        return err;
    }

    match status {
        StatusCode::SERVICE_UNAVAILABLE => ProviderError::ModelLoading {
            message: body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string()),
            estimated_time: body.get("estimated_time").and_then(Value::as_f64),
        },
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after },
        _ => ProviderError::ApiError {
            status: status.as_u16(),
            body,
        },
    }
}

fn parse_generated_text(text: &str) -> Result<String, ProviderError> {
    let body: Value = serde_json::from_str(text)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if let Some(err) = loading_error(&body) {
        return Err(err);
    }

    let generations: Vec<Generation> = serde_json::from_value(body).map_err(|e| {
        ProviderError::MalformedResponse(format!("expected a list of generations: {}", e))
    })?;

    generations
        .into_iter()
        .next()
        .map(|g| g.generated_text)
        .ok_or_else(|| ProviderError::MalformedResponse("empty generation list".to_string()))
}
