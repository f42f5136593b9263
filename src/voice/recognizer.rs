//! The voice worker: microphone chunks in, state mutations out.
//!
//! [`VoiceRecognizer`] owns a Vosk recogniser constrained to the command
//! grammar.  Its loop pulls [`AudioChunk`]s from the capture channel with
//! a 100 ms bounded wait (so shutdown is noticed during silence), converts
//! each to 16 kHz mono PCM, and feeds it to the engine.  Only finalised
//! utterances are parsed; partial results are discarded.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use vosk::{DecodingState, Model, Recognizer};

use crate::config::VoskConfig;
use crate::state::SharedState;

use super::capture::AudioChunk;
use super::command::{grammar_phrases, parse_utterance};
use super::resample::{downmix, resample_to_16k, to_i16_pcm, TARGET_RATE};

/// Bounded wait on the capture channel.
pub const QUEUE_WAIT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// RecognizerError
// ---------------------------------------------------------------------------

/// Errors while constructing the recogniser.  All are fatal at startup.
#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("Vosk model directory not found: {0} (set VOSK_MODEL_PATH)")]
    ModelNotFound(PathBuf),

    #[error("failed to load Vosk model from {0}")]
    ModelLoad(PathBuf),

    #[error("failed to initialise the Vosk recogniser")]
    Init,
}

// ---------------------------------------------------------------------------
// VoiceRecognizer
// ---------------------------------------------------------------------------

/// Grammar-constrained speech recognition worker.
pub struct VoiceRecognizer {
    state: Arc<SharedState>,
    chunks: Receiver<AudioChunk>,
    recognizer: Recognizer,
}

impl std::fmt::Debug for VoiceRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceRecognizer").finish_non_exhaustive()
    }
}

impl VoiceRecognizer {
    /// Load the model and build a grammar-constrained recogniser.
    pub fn new(
        config: &VoskConfig,
        state: Arc<SharedState>,
        chunks: Receiver<AudioChunk>,
    ) -> Result<Self, RecognizerError> {
        let path = &config.model_path;
        if !path.is_dir() {
            return Err(RecognizerError::ModelNotFound(path.clone()));
        }

        let model = Model::new(path.to_string_lossy())
            .ok_or_else(|| RecognizerError::ModelLoad(path.clone()))?;

        let phrases = grammar_phrases();
        let grammar: Vec<&str> = phrases.iter().map(String::as_str).collect();
        let recognizer = Recognizer::new_with_grammar(&model, TARGET_RATE as f32, &grammar)
            .ok_or(RecognizerError::Init)?;

        log::info!(
            "speech recognition ready ({}, {} grammar phrases)",
            config.display_name(),
            phrases.len()
        );

        Ok(Self {
            state,
            chunks,
            recognizer,
        })
    }

    /// Worker loop.
    pub fn run(mut self) {
        log::info!("voice worker started");
        while !self.state.is_shutdown() {
            let chunk = match self.chunks.recv_timeout(QUEUE_WAIT) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => continue,
                // Capture stream gone; nothing left to recognise.
                Err(RecvTimeoutError::Disconnected) => break,
            };
            self.feed(chunk);
        }
        log::info!("voice worker stopped");
    }

    /// Convert one capture buffer and feed it to the engine, dispatching
    /// any finalised utterance.
    fn feed(&mut self, chunk: AudioChunk) {
        let mono = downmix(&chunk.samples, chunk.channels);
        let pcm = to_i16_pcm(&resample_to_16k(&mono, chunk.sample_rate));

        match self.recognizer.accept_waveform(&pcm) {
            Ok(DecodingState::Finalized) => {
                if let Some(result) = self.recognizer.result().single() {
                    let text = result.text.trim().to_lowercase();
                    if !text.is_empty() {
                        log::debug!("heard: {text}");
                        if let Some(command) = parse_utterance(&text) {
                            command.apply(&self.state);
                        }
                    }
                }
            }
            // Partial / running results are not used.
            Ok(_) => {}
            Err(err) => log::warn!("recogniser rejected an audio block: {err:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn missing_model_directory_is_fatal() {
        let config = VoskConfig {
            model_path: PathBuf::from("/no/such/model"),
            model_name: None,
        };
        let (_tx, rx) = mpsc::channel();
        let err = VoiceRecognizer::new(&config, Arc::new(SharedState::new()), rx).unwrap_err();
        assert!(matches!(err, RecognizerError::ModelNotFound(_)));
        assert!(err.to_string().contains("VOSK_MODEL_PATH"));
    }
}
