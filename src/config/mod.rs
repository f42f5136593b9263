//! Configuration for the voice-controlled tree.
//!
//! Everything comes from environment variables (with a `local.env` override
//! file loaded by `main` via `dotenvy`); see [`Config::from_env`].
//! [`paths::expand`] handles `~` / `$HOME` in user-supplied paths.

pub mod paths;
pub mod settings;

pub use settings::{
    AudioConfig, Config, GreenPtConfig, OllamaConfig, TtsConfig, VoskConfig,
};
