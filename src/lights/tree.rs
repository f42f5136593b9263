//! Hardware seam for the LED tree.
//!
//! [`TreeLights`] is the interface the lighting thread renders through.  The
//! real tree is a string of 25 addressable RGB LEDs on SPI (driver internals
//! live outside this crate); [`MemoryTree`] is the in-process backend used
//! for development off the Pi and in tests.
//!
//! A closed handle reports [`TreeError::Closed`] distinctly so the render
//! loop can exit cleanly instead of treating a mid-shutdown write as a
//! hardware fault.

use thiserror::Error;

use super::colour::Colour;

/// Number of addressable lights on the tree.
pub const LIGHT_COUNT: usize = 25;

/// Index of the star LED at the top of the tree.
pub const STAR_INDEX: usize = 3;

// ---------------------------------------------------------------------------
// TreeError
// ---------------------------------------------------------------------------

/// Errors reported by a tree backend.
#[derive(Debug, Clone, Error)]
pub enum TreeError {
    /// The handle was released while still in use.  The render loop treats
    /// this as a clean-exit condition, not a fault.
    #[error("tree handle already closed")]
    Closed,

    /// Index outside `0..LIGHT_COUNT`.
    #[error("light index {0} out of range (tree has {LIGHT_COUNT} lights)")]
    IndexOutOfRange(usize),

    /// Anything the underlying driver reports (SPI write failure etc.).
    #[error("tree hardware fault: {0}")]
    Hardware(String),
}

// ---------------------------------------------------------------------------
// TreeLights trait
// ---------------------------------------------------------------------------

/// Object-safe interface to the LED hardware.
///
/// Owned exclusively by the lighting thread; no other thread touches the
/// handle.  `close` must be idempotent-safe to call on an already-closed
/// handle (it returns [`TreeError::Closed`], which callers may ignore).
pub trait TreeLights: Send {
    /// Set one light to `colour`.
    fn set(&mut self, index: usize, colour: Colour) -> Result<(), TreeError>;

    /// Release the hardware.  Subsequent `set` calls report
    /// [`TreeError::Closed`].
    fn close(&mut self) -> Result<(), TreeError>;
}

// Compile-time assertion: Box<dyn TreeLights> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TreeLights>) {}
};

// ---------------------------------------------------------------------------
// MemoryTree
// ---------------------------------------------------------------------------

/// In-memory tree backend.
///
/// Records the last colour written to each light so tests (and dev runs off
/// the Pi) can inspect the rendered frame.  Counts `close` calls so the
/// release-exactly-once contract is checkable.
pub struct MemoryTree {
    lights: [Colour; LIGHT_COUNT],
    closed: bool,
    close_calls: usize,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self {
            lights: [Colour::BLACK; LIGHT_COUNT],
            closed: false,
            close_calls: 0,
        }
    }

    /// The current frame, for assertions.
    pub fn frame(&self) -> &[Colour; LIGHT_COUNT] {
        &self.lights
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// How many times `close` has been called (including redundant calls).
    pub fn close_calls(&self) -> usize {
        self.close_calls
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeLights for MemoryTree {
    fn set(&mut self, index: usize, colour: Colour) -> Result<(), TreeError> {
        if self.closed {
            return Err(TreeError::Closed);
        }
        if index >= LIGHT_COUNT {
            return Err(TreeError::IndexOutOfRange(index));
        }
        self.lights[index] = colour;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TreeError> {
        self.close_calls += 1;
        if self.closed {
            return Err(TreeError::Closed);
        }
        self.closed = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
