pub mod answer;
pub mod prompt;
pub mod providers;

pub use answer::extract_answer;
pub use prompt::{build_context, compose_prompt};
pub use providers::{InferenceProvider, ProviderError};
