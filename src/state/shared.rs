//! The shared mutable state all three worker threads coordinate through.
//!
//! [`SharedState`] is the explicit shared-state boundary of the system: the
//! voice thread writes commands into it, the lighting thread reads the mode
//! every tick, and the audio thread services requests and restores the mode
//! afterwards.  The scalar fields live behind one coarse mutex with short
//! critical sections (a mode read that is stale by one 50 ms tick is
//! harmless); the audio-request [`Signal`] is the only hard synchronisation
//! point, and shutdown is a set-once atomic flag.
//!
//! # Known race (kept on purpose)
//!
//! A voice command that changes the mode *while* the audio thread has
//! overridden it is lost when [`SharedState::end_playback`] restores the
//! snapshot taken by [`SharedState::begin_playback`] — restore always wins.
//! The original system behaved this way and the window is a single playback,
//! so the behaviour is preserved rather than fixed.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::lights::NamedColour;

use super::signal::Signal;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The single authoritative lighting-pattern selector.
///
/// Closed set — an unrecognised command word never constructs a `Mode` at
/// all, so "unknown mode" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every light shows one colour; the star stays white (off for black).
    Solid(NamedColour),
    /// Hue-cycling over three seeded groups.
    Disco,
    /// Identical rendering to [`Mode::Disco`]; exists so both command words
    /// are recognised.
    Phase,
    /// Randomised per-light twinkle.
    Sparkle,
    /// Static Union-Jack approximation on the 5×5 grid.
    Flag,
    /// Everything off, star included.  Used while audio plays.
    Idle,
}

impl Mode {
    /// Lowercase word for log lines, mirroring the voice command that
    /// selects the mode.
    pub fn word(self) -> &'static str {
        match self {
            Mode::Solid(colour) => colour.word(),
            Mode::Disco => "disco",
            Mode::Phase => "phase",
            Mode::Sparkle => "sparkle",
            Mode::Flag => "gb",
            Mode::Idle => "idle",
        }
    }
}

// ---------------------------------------------------------------------------
// AudioKind
// ---------------------------------------------------------------------------

/// What the audio thread should do for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioKind {
    /// Play the bundled speech clip (capped duration).
    Clip,
    /// Play the configured song to completion.
    Song,
    /// Synthesise the pending text and play it.
    Synthesize,
    /// Fetch a joke from the LLM provider and speak it.
    Joke,
    /// Fetch flattery from the LLM provider and speak it.
    Flattery,
}

impl AudioKind {
    pub fn word(self) -> &'static str {
        match self {
            AudioKind::Clip => "clip",
            AudioKind::Song => "song",
            AudioKind::Synthesize => "synthesize",
            AudioKind::Joke => "joke",
            AudioKind::Flattery => "flattery",
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Bounded FIFO of previously spoken jokes / flattery, passed back to the
/// LLM provider to discourage repetition.  Oldest entries are evicted once
/// the capacity (10) is reached.
#[derive(Debug, Default)]
pub struct History {
    entries: VecDeque<String>,
}

impl History {
    /// Maximum entries kept; beyond this the prompt just bloats.
    pub const CAPACITY: usize = 10;

    pub fn push(&mut self, entry: String) {
        if self.entries.len() == Self::CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// A claimed audio request, returned by [`SharedState::begin_playback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRequest {
    pub kind: AudioKind,
    /// Only meaningful for [`AudioKind::Synthesize`].
    pub text: Option<String>,
}

/// Fields behind the coarse mutex.
struct Inner {
    mode: Mode,
    /// Snapshot of `mode` taken when the audio thread overrides it; only
    /// meaningful between `begin_playback` and `end_playback`.
    last_mode: Mode,
    pending_text: Option<String>,
    audio_kind: Option<AudioKind>,
    /// Set between a successful `begin_playback` and the matching
    /// `end_playback`; guards the mode restore so a spurious wake never
    /// reverts a mode that was not overridden.
    in_playback: bool,
    joke_history: History,
    flattery_history: History,
}

/// Single-instance, process-lifetime shared state.  Create once with
/// [`SharedState::new`] and hand `Arc` clones to each worker.
pub struct SharedState {
    inner: Mutex<Inner>,
    audio_request: Signal,
    shutdown: AtomicBool,
}

impl SharedState {
    /// The tree starts in disco mode, matching what people expect a
    /// Christmas tree to do before anyone has said a word.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                mode: Mode::Disco,
                last_mode: Mode::Disco,
                pending_text: None,
                audio_kind: None,
                in_playback: false,
                joke_history: History::default(),
                flattery_history: History::default(),
            }),
            audio_request: Signal::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    // -----------------------------------------------------------------------
    // Mode
    // -----------------------------------------------------------------------

    /// Current lighting mode.  Read by the lighting thread every tick.
    pub fn mode(&self) -> Mode {
        self.inner.lock().unwrap().mode
    }

    /// Set the lighting mode from a voice command.  A redundant set is a
    /// logged no-op.
    pub fn set_mode(&self, mode: Mode) {
        let mut inner = self.inner.lock().unwrap();
        if inner.mode == mode {
            log::debug!("mode already {}; ignoring", mode.word());
            return;
        }
        inner.mode = mode;
    }

    // -----------------------------------------------------------------------
    // Audio requests (single-slot mailbox, overwrite on full)
    // -----------------------------------------------------------------------

    /// Raise an audio request from the voice thread.
    ///
    /// If a request is already pending the kind and text are overwritten in
    /// place and the signal stays set — there is no queue.  The audio thread
    /// services whatever is in the slot when it wakes.
    pub fn request_audio(&self, kind: AudioKind, text: Option<String>) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.audio_kind.is_some() {
                log::debug!(
                    "audio request {} overwrites pending {}",
                    kind.word(),
                    inner.audio_kind.map(AudioKind::word).unwrap_or("?")
                );
            }
            inner.audio_kind = Some(kind);
            inner.pending_text = text;
        }
        self.audio_request.set();
    }

    /// Block until an audio request is raised or `timeout` elapses.
    /// Returns `true` when a request may be pending.
    pub fn wait_audio_request(&self, timeout: Duration) -> bool {
        self.audio_request.wait_timeout(timeout)
    }

    /// Claim the pending request and suppress the lights for its duration:
    /// the current mode is snapshotted into `last_mode` and overridden to
    /// sparkle (jokes get a show) or idle (everything else).
    ///
    /// Returns `None` when the signal fired without a kind in the slot
    /// (spurious wake-up); the caller should still call
    /// [`SharedState::end_playback`] to clear the signal.
    pub fn begin_playback(&self) -> Option<AudioRequest> {
        let mut inner = self.inner.lock().unwrap();
        let kind = inner.audio_kind?;
        inner.in_playback = true;
        inner.last_mode = inner.mode;
        inner.mode = match kind {
            AudioKind::Joke => Mode::Sparkle,
            _ => Mode::Idle,
        };
        Some(AudioRequest {
            kind,
            text: inner.pending_text.take(),
        })
    }

    /// Finish servicing a request: restore the pre-playback mode (unless
    /// shutdown arrived meanwhile — then the mode is left as-is so the
    /// lighting thread just exits), and clear kind, text and signal.
    ///
    /// After a spurious wake (the signal fired but [`SharedState::begin_playback`]
    /// found no kind) only the slot and signal are cleared — the mode was
    /// never overridden, so there is nothing to restore.
    pub fn end_playback(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.in_playback && !self.is_shutdown() {
                inner.mode = inner.last_mode;
            }
            inner.in_playback = false;
            inner.audio_kind = None;
            inner.pending_text = None;
        }
        self.audio_request.clear();
    }

    // -----------------------------------------------------------------------
    // Histories
    // -----------------------------------------------------------------------

    pub fn joke_history(&self) -> Vec<String> {
        self.inner.lock().unwrap().joke_history.snapshot()
    }

    pub fn push_joke(&self, joke: String) {
        self.inner.lock().unwrap().joke_history.push(joke);
    }

    pub fn flattery_history(&self) -> Vec<String> {
        self.inner.lock().unwrap().flattery_history.snapshot()
    }

    pub fn push_flattery(&self, flattery: String) {
        self.inner.lock().unwrap().flattery_history.push(flattery);
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Signal all workers to stop.  Set once by the orchestrator; also wakes
    /// the audio thread so it notices promptly.
    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.audio_request.set();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
