//! Audio file playback via `rodio`.
//!
//! [`Player`] opens the output device per call, mirroring one-playback-at-a-
//! time use: the audio worker is the only caller and never overlaps plays.
//! Device selection prefers an output whose name contains the configured
//! substring (the ReSpeaker board by default) and falls back to the system
//! default.  Every play call validates the file first — missing, unreadable
//! and empty files are distinct, recoverable errors, and a decoder failure
//! is reported distinctly from normal end-of-playback.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors from a play call.  All are recoverable — the audio worker logs
/// and clears the request either way.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio file not found: {0}")]
    Missing(PathBuf),

    #[error("audio file not readable: {0}")]
    Unreadable(PathBuf),

    #[error("audio file is empty: {0}")]
    Empty(PathBuf),

    /// No output stream could be opened on the chosen device.
    #[error("failed to open audio output: {0}")]
    Output(String),

    /// The player reported an error state (bad/corrupt media), as opposed
    /// to reaching normal end-of-playback.
    #[error("failed to decode audio: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Playback trait
// ---------------------------------------------------------------------------

/// Seam between the audio worker and the playback stack.
pub trait Playback: Send {
    /// Play `path` to completion, or for at most `cap` when given.
    fn play(&self, path: &Path, cap: Option<Duration>) -> Result<(), PlaybackError>;
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// rodio-backed player.  Holds only configuration; streams are opened per
/// call and released when the call returns.
pub struct Player {
    /// Case-insensitive output device name substring; empty disables
    /// matching.
    device_substring: String,
    /// Volume percent, 0–100.
    volume: u8,
}

impl Player {
    pub fn new(device_substring: &str, volume: u8) -> Self {
        Self {
            device_substring: device_substring.to_lowercase(),
            volume: volume.min(100),
        }
    }

    /// Validate that `path` exists, is readable and non-empty.  Returns the
    /// opened file so playback doesn't race a concurrent delete.
    fn validate(&self, path: &Path) -> Result<File, PlaybackError> {
        let meta = std::fs::metadata(path).map_err(|_| PlaybackError::Missing(path.into()))?;
        if meta.len() == 0 {
            return Err(PlaybackError::Empty(path.into()));
        }
        File::open(path).map_err(|_| PlaybackError::Unreadable(path.into()))
    }

    /// Open an output stream on the preferred device, or the default.
    fn open_output(&self) -> Result<(OutputStream, rodio::OutputStreamHandle), PlaybackError> {
        if !self.device_substring.is_empty() {
            if let Some(device) = self.find_device() {
                match OutputStream::try_from_device(&device) {
                    Ok(pair) => return Ok(pair),
                    Err(err) => {
                        log::warn!("preferred output device failed ({err}); using default");
                    }
                }
            }
        }
        OutputStream::try_default().map_err(|e| PlaybackError::Output(e.to_string()))
    }

    fn find_device(&self) -> Option<cpal::Device> {
        let host = cpal::default_host();
        let devices = match host.output_devices() {
            Ok(devices) => devices,
            Err(err) => {
                log::warn!("could not enumerate output devices: {err}");
                return None;
            }
        };
        for device in devices {
            if let Ok(name) = device.name() {
                if name.to_lowercase().contains(&self.device_substring) {
                    log::debug!("using output device {name}");
                    return Some(device);
                }
            }
        }
        None
    }
}

impl Playback for Player {
    fn play(&self, path: &Path, cap: Option<Duration>) -> Result<(), PlaybackError> {
        let file = self.validate(path)?;

        let (_stream, handle) = self.open_output()?;
        let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::Output(e.to_string()))?;
        sink.set_volume(self.volume as f32 / 100.0);

        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode(e.to_string()))?;
        sink.append(source);

        match cap {
            // Play to completion.
            None => sink.sleep_until_end(),
            // Capped: stop the sink once the limit elapses.
            Some(limit) => {
                let started = Instant::now();
                while !sink.empty() {
                    if started.elapsed() >= limit {
                        sink.stop();
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
