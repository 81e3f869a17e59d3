use crate::models::{ChatReply, ChatRequest};
use crate::services::{build_context, compose_prompt, extract_answer, ProviderError};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use metrics::{counter, histogram};
use serde_json::Value;
use service_core::error::AppError;
use service_core::observability::extract_request_id;
use std::time::Instant;
use validator::Validate;

pub const MODEL_LOADING_MESSAGE: &str =
    "The AI model is currently loading. Please try again in a few moments.";
pub const RATE_LIMITED_MESSAGE: &str =
    "Too many requests. Please wait a moment before trying again.";
pub const UNREACHABLE_MESSAGE: &str = "Could not reach the AI service. Please try again later.";
pub const UPSTREAM_FAILURE_MESSAGE: &str =
    "Something went wrong with the AI service. Please try again later.";

/// Answer one question about the catalog.
///
/// The body is parsed leniently: an empty body, invalid JSON or a missing
/// `message` all surface as the same validation error.
#[tracing::instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatReply>, AppError> {
    let request: ChatRequest = serde_json::from_slice(&body).unwrap_or_default();
    request.validate()?;

    let context = build_context(&state.catalog);
    let prompt = compose_prompt(&context, &request.message);

    let start = Instant::now();
    let request_id = extract_request_id(&headers);
    let result = state
        .provider
        .generate(&prompt, request_id.as_deref())
        .await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    counter!("inference_requests_total", "outcome" => outcome).increment(1);
    histogram!("inference_duration_seconds").record(start.elapsed().as_secs_f64());

    let generated = result.map_err(|e| {
        tracing::error!(
            provider = state.provider.name(),
            error = %e,
            kind = e.kind(),
            "Inference call failed"
        );
        provider_error_response(e)
    })?;

    let reply = extract_answer(&generated, &request.message);
    tracing::info!(
        prompt_len = prompt.len(),
        reply_len = reply.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Relayed chat answer"
    );

    Ok(Json(ChatReply { reply }))
}

fn provider_error_response(err: ProviderError) -> AppError {
    match err {
        ProviderError::ModelLoading {
            message,
            estimated_time,
        } => AppError::ServiceUnavailable {
            message: MODEL_LOADING_MESSAGE.to_string(),
            details: Some(Value::String(message)),
            retry_after: estimated_time
                .filter(|t| t.is_finite() && *t > 0.0)
                .map(|t| t.ceil() as u64),
        },
        ProviderError::RateLimited { retry_after } => {
            AppError::TooManyRequests(RATE_LIMITED_MESSAGE.to_string(), retry_after)
        }
        ProviderError::NetworkError(msg) => AppError::UpstreamError {
            message: UNREACHABLE_MESSAGE.to_string(),
            details: Some(Value::String(msg)),
        },
        ProviderError::ApiError { body, .. } => AppError::UpstreamError {
            message: UPSTREAM_FAILURE_MESSAGE.to_string(),
            details: Some(body),
        },
        err @ (ProviderError::MalformedResponse(_) | ProviderError::NotConfigured(_)) => {
            AppError::UpstreamError {
                message: UPSTREAM_FAILURE_MESSAGE.to_string(),
                details: Some(Value::String(err.to_string())),
            }
        }
    }
}
