//! Text-to-speech.
//!
//! Two interchangeable engines behind one trait:
//! * [`PiperTts`] — external neural synthesiser, preferred when installed.
//! * [`EspeakTts`] — espeak-ng, always available as the fallback.
//!
//! [`Synthesizer`] fixes the choice at startup and performs the one-shot
//! per-request fallback from Piper to espeak-ng on failure.

pub mod engine;
pub mod espeak;
pub mod piper;
pub mod synthesizer;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::{TtsEngine, TtsError};
pub use espeak::EspeakTts;
pub use piper::PiperTts;
pub use synthesizer::{EnginePreference, Synthesis, Synthesizer};
