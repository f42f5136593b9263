//! Offline voice-controlled RGB LED Christmas tree coordinator.
//!
//! Three worker threads share one [`state::SharedState`]:
//!
//! * [`lights::LightingController`] — drives the 25-LED tree at ~20 Hz,
//!   rendering the current mode (solid colours, disco, phase, sparkle,
//!   the GB flag, or idle).
//! * [`audio::AudioController`] — serialises all audio output: bundled
//!   clip, configured song, synthesised speech, and LLM-generated jokes
//!   and flattery.  Lighting is muted or sparkled for the duration.
//! * [`voice::VoiceRecognizer`] — grammar-constrained Vosk recognition of
//!   `christmas tree <word>` commands from the microphone stream.
//!
//! Everything runs offline except the optional LLM providers ([`llm`]),
//! which are either a remote OpenAI-compatible API or a local Ollama
//! daemon.

pub mod audio;
pub mod config;
pub mod lights;
pub mod llm;
pub mod state;
pub mod tts;
pub mod voice;
