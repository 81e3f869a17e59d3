//! Mock provider for testing.

use super::{InferenceProvider, ProviderError};
use async_trait::async_trait;
use std::sync::Mutex;

enum MockOutcome {
    Reply(String),
    EchoPrompt(String),
    Fail(ProviderError),
}

/// Scripted provider that records every prompt it receives.
pub struct MockProvider {
    outcome: MockOutcome,
    prompts: Mutex<Vec<String>>,
    request_ids: Mutex<Vec<Option<String>>>,
}

impl MockProvider {
    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            prompts: Mutex::new(Vec::new()),
            request_ids: Mutex::new(Vec::new()),
        }
    }

    /// Always generate `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Reply(text.into()))
    }

    /// Echo the prompt back followed by `answer`, like a model that ignores the turn boundary.
    pub fn echoing(answer: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::EchoPrompt(answer.into()))
    }

    /// Always fail with `err`.
    pub fn failing(err: ProviderError) -> Self {
        Self::with_outcome(MockOutcome::Fail(err))
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// Request ids passed alongside each prompt.
    pub fn request_ids(&self) -> Vec<Option<String>> {
        self.request_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        request_id: Option<&str>,
    ) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Ok(mut ids) = self.request_ids.lock() {
            ids.push(request_id.map(str::to_string));
        }

        match &self.outcome {
            MockOutcome::Reply(text) => Ok(text.clone()),
            MockOutcome::EchoPrompt(answer) => Ok(format!("{} {}", prompt, answer)),
            MockOutcome::Fail(err) => Err(err.clone()),
        }
    }
}
