//! Shared coordination state for the three worker threads.
//!
//! This module provides:
//! * [`SharedState`] — the single shared-mutable-state boundary (mode, audio
//!   request slot, histories, shutdown flag).
//! * [`Signal`] — the condvar-backed binary signal used for audio requests.
//! * [`Mode`] / [`AudioKind`] — the closed enumerations the threads exchange.
//! * [`History`] — bounded FIFO of previously generated jokes / flattery.

pub mod shared;
pub mod signal;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use shared::{AudioKind, AudioRequest, History, Mode, SharedState};
pub use signal::Signal;
