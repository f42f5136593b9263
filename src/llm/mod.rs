//! LLM joke / flattery providers.
//!
//! This module provides:
//! * [`LlmProvider`] — async trait implemented by both backends.
//! * [`GreenPt`] — remote OpenAI-compatible API (bearer key).
//! * [`Ollama`] — local daemon, no authentication.
//! * [`prompt`] — shared prompt construction (randomised joke prompts,
//!   fixed flattery prompt, do-not-repeat history clause).
//! * [`LlmError`] — error variants for provider operations.
//!
//! The backend is selected once at startup via the `--llm-provider` flag
//! and held behind an `Arc<dyn LlmProvider>` by the audio worker.

pub mod greenpt;
pub mod ollama;
pub mod prompt;
pub mod provider;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use greenpt::GreenPt;
pub use ollama::Ollama;
pub use provider::{LlmError, LlmProvider};
