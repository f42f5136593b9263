//! Voice input: microphone capture, sample conversion, the command
//! grammar, and the recognition worker.
//!
//! * [`Microphone`] — cpal capture with preferred-device selection.
//! * [`resample`] — downmix / resample / PCM conversion for the engine.
//! * [`command`] — the `christmas tree <word>` grammar and parser.
//! * [`VoiceRecognizer`] — the worker thread feeding Vosk and dispatching
//!   parsed commands onto the shared state.

pub mod capture;
pub mod command;
pub mod recognizer;
pub mod resample;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use capture::{AudioChunk, CaptureError, Microphone, StreamHandle};
pub use command::{grammar_phrases, parse_utterance, Command, WAKE_PHRASE};
pub use recognizer::{RecognizerError, VoiceRecognizer, QUEUE_WAIT};
