//! Microphone capture via `cpal`.
//!
//! [`Microphone`] wraps the cpal host/device/stream lifecycle.  Device
//! selection prefers an input whose name contains the configured substring
//! (the ReSpeaker array by default) and falls back to the system default
//! input.  [`Microphone::start`] begins streaming [`AudioChunk`]s over an
//! mpsc channel; the returned [`StreamHandle`] is a RAII guard — dropping
//! it stops the underlying cpal stream.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in `[-1.0, 1.0]` at the device's native
/// rate; the recogniser downmixes and resamples to the 16 kHz mono PCM
/// that Vosk expects.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.  Dropping it stops the
/// hardware stream.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors while setting up or starting microphone capture.  All are fatal
/// at startup — without a microphone the tree is just a lamp.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// Microphone
// ---------------------------------------------------------------------------

/// Microphone wrapper built on top of `cpal`.
pub struct Microphone {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl Microphone {
    /// Open the preferred input device, falling back to the system default.
    ///
    /// `preferred` is matched case-insensitively against device names; an
    /// empty string disables matching.  The device's own preferred stream
    /// configuration is used, so no manual rate/channel setup is required.
    pub fn open(preferred: &str) -> Result<Self, CaptureError> {
        let host = cpal::default_host();

        let device = match Self::find_device(&host, preferred) {
            Some(device) => device,
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
        };

        if let Ok(name) = device.name() {
            log::info!("microphone: {name}");
        }

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    fn find_device(host: &cpal::Host, preferred: &str) -> Option<cpal::Device> {
        if preferred.is_empty() {
            return None;
        }
        let preferred = preferred.to_lowercase();
        let devices = match host.input_devices() {
            Ok(devices) => devices,
            Err(err) => {
                log::warn!("could not enumerate input devices: {err}");
                return None;
            }
        };
        for device in devices {
            if let Ok(name) = device.name() {
                if name.to_lowercase().contains(&preferred) {
                    return Some(device);
                }
            }
        }
        log::warn!("no input device matching {preferred:?}; using default");
        None
    }

    /// Start recording and send [`AudioChunk`]s to `tx`.
    ///
    /// The cpal callback runs on a dedicated audio thread; send errors
    /// (receiver dropped during shutdown) are ignored so that thread never
    /// panics.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let chunk = AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                };
                let _ = tx.send(chunk);
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None, // no timeout
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    /// Native sample rate of the capture stream in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels in each chunk.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
