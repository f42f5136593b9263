//! espeak-ng — the built-in fallback engine.
//!
//! Always constructible: espeak-ng is a small system package, and if even
//! that is missing the synthesis call fails at request time and the audio
//! worker logs and moves on.  Quality is robotic but serviceable; Piper is
//! preferred whenever it is installed.

use std::path::Path;
use std::process::Command;

use crate::config::TtsConfig;

use super::engine::{TtsEngine, TtsError, validate_output};

const ENGINE_NAME: &str = "espeak-ng";

// ---------------------------------------------------------------------------
// EspeakTts
// ---------------------------------------------------------------------------

/// Drives the `espeak-ng` binary with `-w <out.wav>`.
pub struct EspeakTts {
    voice: String,
    /// Words per minute.  Slower than espeak's default 175; clearer through
    /// the tree's little speaker.
    rate: u32,
}

impl EspeakTts {
    pub fn new(config: &TtsConfig) -> Self {
        Self {
            voice: config.espeak_voice.clone(),
            rate: config.espeak_rate,
        }
    }
}

impl TtsEngine for EspeakTts {
    fn synthesize(&self, text: &str, output: &Path) -> Result<(), TtsError> {
        let result = Command::new("espeak-ng")
            .arg("-v")
            .arg(&self.voice)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-w")
            .arg(output)
            .arg(text)
            .output()
            .map_err(|source| TtsError::Spawn {
                engine: "espeak-ng",
                source,
            })?;

        if !result.status.success() {
            return Err(TtsError::Failed {
                engine: "espeak-ng",
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        validate_output("espeak-ng", output)
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn voice(&self) -> String {
        self.voice.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
