//! LED tree rendering.
//!
//! * [`Colour`] / [`NamedColour`] — colour maths and the voice-grammar
//!   colour words.
//! * [`Animator`] — per-mode frame seeding and ticking (pure, no hardware).
//! * [`TreeLights`] — the hardware seam, with [`MemoryTree`] for tests and
//!   dev runs off the Pi.
//! * [`LightingController`] — the worker that ties mode, animator and
//!   hardware together at ~20 Hz.

pub mod colour;
pub mod controller;
pub mod patterns;
pub mod tree;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use colour::{Colour, NamedColour};
pub use controller::{LightingController, TICK_PERIOD};
pub use patterns::{Animator, HUE_STEP_DEGREES};
pub use tree::{LIGHT_COUNT, MemoryTree, STAR_INDEX, TreeError, TreeLights};
