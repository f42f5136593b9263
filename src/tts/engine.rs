//! Core TTS engine trait and error type.
//!
//! [`TtsEngine`] is the seam between the audio worker and the two synthesis
//! backends ([`PiperTts`](crate::tts::PiperTts) subprocess,
//! [`EspeakTts`](crate::tts::EspeakTts) local binary).  Both take text and
//! produce a WAV file at a caller-chosen path; playback is a separate
//! concern handled by the player.

use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// Errors from either synthesis engine.
#[derive(Debug, Error)]
pub enum TtsError {
    /// The engine binary could not be spawned.
    #[error("failed to launch {engine}: {source}")]
    Spawn {
        engine: &'static str,
        source: std::io::Error,
    },

    /// The engine ran but exited non-zero.
    #[error("{engine} exited with {status}: {stderr}")]
    Failed {
        engine: &'static str,
        status: String,
        stderr: String,
    },

    /// The engine did not finish within its deadline.
    #[error("{engine} timed out after {seconds} s")]
    Timeout {
        engine: &'static str,
        seconds: u64,
    },

    /// The engine reported success but the output WAV is missing or empty.
    #[error("{engine} produced no output file")]
    NoOutput { engine: &'static str },

    /// Writing text to the engine's stdin failed.
    #[error("failed to feed text to {engine}: {source}")]
    Stdin {
        engine: &'static str,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// TtsEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for text-to-speech engines.
///
/// # Contract
///
/// On `Ok(())` the file at `output` exists and is non-empty; engines must
/// validate this themselves since a subprocess can exit zero without
/// writing anything.
pub trait TtsEngine: Send + Sync {
    /// Synthesise `text` into a WAV file at `output`.
    fn synthesize(&self, text: &str, output: &Path) -> Result<(), TtsError>;

    /// Engine name for the startup summary ("Piper TTS", "espeak-ng").
    fn name(&self) -> &'static str;

    /// Voice or model identifier for the startup summary.
    fn voice(&self) -> String;
}

// Compile-time assertion: Box<dyn TtsEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TtsEngine>) {}
};

/// Check an engine's output file: present and non-empty.
pub(crate) fn validate_output(engine: &'static str, output: &Path) -> Result<(), TtsError> {
    match std::fs::metadata(output) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(TtsError::NoOutput { engine }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
