//! Engine selection and the one-shot runtime fallback.
//!
//! [`Synthesizer`] picks an engine once at construction — Piper when the
//! executable and voice model are both present, espeak-ng otherwise — and
//! keeps that choice for the process lifetime.  A Piper failure during an
//! actual request additionally falls back to espeak-ng *for that request
//! only*; this is a single fallback hop, not a retry loop.

use tempfile::NamedTempFile;

use crate::config::TtsConfig;

use super::engine::{TtsEngine, TtsError};
use super::espeak::EspeakTts;
use super::piper::PiperTts;

// ---------------------------------------------------------------------------
// EnginePreference
// ---------------------------------------------------------------------------

/// User preference from the `--tts-engine` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnginePreference {
    /// Prefer Piper when available, espeak-ng otherwise.
    #[default]
    Auto,
    /// Require Piper; warns and uses espeak-ng when unavailable.
    Piper,
    /// Force espeak-ng.
    Espeak,
}

// ---------------------------------------------------------------------------
// Synthesis trait
// ---------------------------------------------------------------------------

/// What the audio worker needs from the synthesis layer.  Implemented by
/// [`Synthesizer`]; mocked in the worker's tests.
pub trait Synthesis: Send {
    /// Synthesise `text` to a scratch WAV file, deleted when the handle
    /// drops.
    fn to_wav(&self, text: &str) -> Result<NamedTempFile, TtsError>;
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// The audio worker's synthesis entry point: text in, temporary WAV out.
pub struct Synthesizer {
    /// Piper, when discovered and selected.  `None` means espeak-only.
    primary: Option<PiperTts>,
    fallback: EspeakTts,
}

impl Synthesizer {
    /// Fix the engine choice for the process lifetime.
    pub fn choose(preference: EnginePreference, config: &TtsConfig) -> Self {
        let fallback = EspeakTts::new(config);

        let primary = match preference {
            EnginePreference::Espeak => {
                log::info!("TTS: using espeak-ng (user preference)");
                None
            }
            EnginePreference::Piper => match PiperTts::discover(config) {
                Some(piper) => {
                    log::info!("TTS: using {} ({})", piper.name(), piper.voice());
                    Some(piper)
                }
                None => {
                    log::warn!("TTS: Piper requested but not available; using espeak-ng");
                    None
                }
            },
            EnginePreference::Auto => match PiperTts::discover(config) {
                Some(piper) => {
                    log::info!("TTS: using {} ({})", piper.name(), piper.voice());
                    Some(piper)
                }
                None => {
                    log::info!("TTS: using espeak-ng (Piper not available)");
                    None
                }
            },
        };

        Self { primary, fallback }
    }

    /// Build directly from engines (tests).
    #[cfg(test)]
    pub fn from_engines(primary: Option<PiperTts>, fallback: EspeakTts) -> Self {
        Self { primary, fallback }
    }

    /// Synthesise `text` to a scratch WAV file.
    ///
    /// The file is deleted when the returned handle drops, so the caller
    /// plays it before letting go.
    pub fn synthesize(&self, text: &str) -> Result<NamedTempFile, TtsError> {
        let output = tempfile::Builder::new()
            .prefix("voice-tree-")
            .suffix(".wav")
            .tempfile()
            .map_err(|source| TtsError::Spawn {
                engine: "tempfile",
                source,
            })?;

        if let Some(piper) = &self.primary {
            match piper.synthesize(text, output.path()) {
                Ok(()) => return Ok(output),
                Err(err) => {
                    // One-shot fallback for this request; the startup choice
                    // stands for the next one.
                    log::warn!("Piper synthesis failed ({err}); falling back to espeak-ng");
                }
            }
        }

        self.fallback.synthesize(text, output.path())?;
        Ok(output)
    }

    /// Engine name for the startup summary.
    pub fn engine_name(&self) -> &'static str {
        match &self.primary {
            Some(piper) => piper.name(),
            None => self.fallback.name(),
        }
    }

    /// Voice / model identifier for the startup summary.
    pub fn voice(&self) -> String {
        match &self.primary {
            Some(piper) => piper.voice(),
            None => self.fallback.voice(),
        }
    }
}

impl Synthesis for Synthesizer {
    fn to_wav(&self, text: &str) -> Result<NamedTempFile, TtsError> {
        Synthesizer::synthesize(self, text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
