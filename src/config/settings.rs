//! Env-var backed configuration.
//!
//! All settings come from environment variables, after `main` has loaded the
//! optional `local.env` override file (variables already set in the process
//! environment take precedence over the file).  Each section struct has a
//! `Default` matching the documented defaults, and `Config::from_env`
//! assembles the whole thing in one pass.

use std::env;
use std::path::PathBuf;

use super::paths::expand;

// ---------------------------------------------------------------------------
// Env helpers
// ---------------------------------------------------------------------------

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

// ---------------------------------------------------------------------------
// VoskConfig
// ---------------------------------------------------------------------------

/// Speech-recognition model settings.
#[derive(Debug, Clone)]
pub struct VoskConfig {
    /// Directory containing the extracted Vosk model.  Missing directory is
    /// fatal at startup.
    pub model_path: PathBuf,
    /// Explicit model name for the startup summary; derived from the path
    /// when unset.
    pub model_name: Option<String>,
}

impl VoskConfig {
    /// The model name shown in the configuration summary: the explicit
    /// `VOSK_MODEL_NAME` override, otherwise the model directory's name.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.model_name {
            return name.clone();
        }
        self.model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.model_path.display().to_string())
    }
}

impl Default for VoskConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model"),
            model_name: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Capture / playback device selection and the audio assets.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Input device name substring (case-insensitive); system default input
    /// when no device matches.
    pub mic_device: String,
    /// Output device name substring; system default output when no match.
    pub output_device: String,
    /// Playback volume percentage, clamped to 0–100.
    pub volume: u8,
    /// Audio file for the "speak" command (played with a 10 s cap).
    pub clip_path: PathBuf,
    /// Audio file for the "sing" command (played to completion).
    pub song_path: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            mic_device: "respeaker".into(),
            output_device: "respeaker".into(),
            volume: 75,
            clip_path: PathBuf::from("speech.mp3"),
            song_path: PathBuf::from("song.mp3"),
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Text-to-speech settings for both engines.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Explicit Piper executable path; when unset the standard install
    /// locations are probed.
    pub piper_executable: Option<PathBuf>,
    /// Piper `.onnx` voice model (`~` / `$HOME` expanded).  Piper is only
    /// eligible when this is set and the file exists.
    pub piper_model: Option<PathBuf>,
    /// espeak-ng voice used by the fallback engine.
    pub espeak_voice: String,
    /// espeak-ng speaking rate in words per minute; slower than the espeak
    /// default because the default sounds rushed through a small speaker.
    pub espeak_rate: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            piper_executable: None,
            piper_model: None,
            espeak_voice: "en".into(),
            espeak_rate: 130,
        }
    }
}

// ---------------------------------------------------------------------------
// GreenPtConfig / OllamaConfig
// ---------------------------------------------------------------------------

/// GreenPT (OpenAI-compatible remote API) settings.
#[derive(Debug, Clone)]
pub struct GreenPtConfig {
    pub base_url: String,
    /// Missing key is a per-call error, not a startup failure — the rest of
    /// the tree works fine without jokes.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GreenPtConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.greenpt.ai/v1".into(),
            api_key: None,
            model: "gemma-3-27b-it".into(),
        }
    }
}

/// Local Ollama daemon settings.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "llama3.2:3b".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, assembled once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub vosk: VoskConfig,
    pub audio: AudioConfig,
    pub tts: TtsConfig,
    pub greenpt: GreenPtConfig,
    pub ollama: OllamaConfig,
    /// Hardcoded joke override (`JOKE_TEXT`).  When set, the "joke" command
    /// speaks this verbatim and never touches the provider or the history.
    pub joke_text: Option<String>,
}

impl Config {
    /// Read every setting from the environment.  Call after `dotenvy` has
    /// loaded `local.env`.
    pub fn from_env() -> Self {
        let defaults_audio = AudioConfig::default();
        let defaults_greenpt = GreenPtConfig::default();
        let defaults_ollama = OllamaConfig::default();
        let defaults_tts = TtsConfig::default();

        let volume = var("AUDIO_VOLUME")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|v| v.clamp(0, 100) as u8)
            .unwrap_or(defaults_audio.volume);

        Self {
            vosk: VoskConfig {
                model_path: expand(&var_or("VOSK_MODEL_PATH", "model")),
                model_name: var("VOSK_MODEL_NAME"),
            },
            audio: AudioConfig {
                mic_device: var_or("MIC_DEVICE", &defaults_audio.mic_device),
                output_device: var_or("OUTPUT_DEVICE", &defaults_audio.output_device),
                volume,
                clip_path: expand(&var_or("SPEECH_CLIP_PATH", "speech.mp3")),
                song_path: expand(&var_or("SONG_PATH", "song.mp3")),
            },
            tts: TtsConfig {
                piper_executable: var("PIPER_EXECUTABLE_PATH").map(|p| expand(&p)),
                piper_model: var("PIPER_MODEL_PATH").map(|p| expand(&p)),
                espeak_voice: defaults_tts.espeak_voice,
                espeak_rate: defaults_tts.espeak_rate,
            },
            greenpt: GreenPtConfig {
                base_url: var_or("GREENPT_API_BASE_URL", &defaults_greenpt.base_url),
                api_key: var("GREENPT_API_KEY"),
                model: var_or("GREENPT_MODEL_ID", &defaults_greenpt.model),
            },
            ollama: OllamaConfig {
                base_url: var_or("OLLAMA_API_BASE_URL", &defaults_ollama.base_url),
                model: var_or("OLLAMA_MODEL_ID", &defaults_ollama.model),
            },
            joke_text: var("JOKE_TEXT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
