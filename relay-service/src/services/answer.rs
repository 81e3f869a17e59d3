//! Pulls the assistant's answer out of raw model output.
//!
//! Small instruction-tuned models often echo part of the prompt before
//! answering, so the answer is whatever follows the last turn marker, or
//! failing that, the echoed question.

use super::prompt::{QUESTION_LABEL, TURN_MARKER};

pub fn extract_answer(generated: &str, message: &str) -> String {
    if let Some(idx) = generated.rfind(TURN_MARKER) {
        return generated[idx + TURN_MARKER.len()..].trim().to_string();
    }

    let echo = format!("{} {}", QUESTION_LABEL, message);
    if let Some(idx) = generated.find(&echo) {
        return generated[idx + echo.len()..].trim().to_string();
    }

    generated.trim().to_string()
}
