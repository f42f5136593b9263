//! Core `LlmProvider` trait and error type.
//!
//! Both backends (GreenPT remote API, local Ollama daemon) expose the same
//! two operations: fetch a joke or a piece of flattery, given the history of
//! what has already been spoken so the model is told not to repeat itself.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching text from a provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The provider answered but with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The provider requires an API key and none is configured.
    #[error("no API key configured (set {0})")]
    MissingApiKey(&'static str),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_connect() {
            LlmError::Request(format!("connection failed: {e}"))
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// LlmProvider trait
// ---------------------------------------------------------------------------

/// Async interface for the joke / flattery backends.
///
/// Implementors must be `Send + Sync` so the audio worker can hold one
/// behind an `Arc<dyn LlmProvider>` and call it via `Handle::block_on`.
///
/// `history` is what the tree has already said this session (bounded to the
/// last 10 entries by the caller); providers embed it in the prompt to
/// discourage repetition.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn joke(&self, history: &[String]) -> Result<String, LlmError>;

    async fn flattery(&self, history: &[String]) -> Result<String, LlmError>;

    /// Provider name for the startup summary ("GreenPT", "Ollama").
    fn provider_name(&self) -> &'static str;

    /// Model identifier for the startup summary.
    fn model_name(&self) -> String;
}

// Compile-time assertion: Box<dyn LlmProvider> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn LlmProvider>) {}
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(LlmError::Timeout.to_string(), "LLM request timed out");
        assert!(
            LlmError::MissingApiKey("GREENPT_API_KEY")
                .to_string()
                .contains("GREENPT_API_KEY")
        );
    }
}
