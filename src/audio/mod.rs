//! Audio output: file playback and the worker that serialises it.
//!
//! * [`Player`] — rodio-backed playback with output-device preference.
//! * [`AudioController`] — the worker thread; waits on the shared request
//!   signal, dispatches one action at a time, and restores the lighting
//!   mode afterwards.

pub mod controller;
pub mod player;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{AudioController, CLIP_DURATION_CAP, DEFAULT_GENERATE_TEXT, REQUEST_WAIT};
pub use player::{Playback, PlaybackError, Player};
