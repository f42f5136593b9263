//! Frame rendering for each lighting mode.
//!
//! [`Animator`] owns the 25-colour frame and advances it one tick at a time.
//! The controller calls [`Animator::transition`] whenever the shared mode
//! changes value between two consecutive ticks, which re-seeds the frame
//! deterministically — without the reseed, hue cycling would continue from
//! whatever colours the previous mode left behind and appear stuck.
//!
//! Randomness (sparkle, and the sparkle seed) comes from an injected
//! [`SmallRng`] so tests can drive the animator with a fixed seed.

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::state::Mode;

use super::colour::{Colour, NamedColour};
use super::tree::{LIGHT_COUNT, STAR_INDEX};

/// Degrees of hue advanced per tick in disco / phase modes.
pub const HUE_STEP_DEGREES: f32 = 10.0;

/// Seed colours for the three index-modulo-3 groups in disco / phase.
const GROUP_SEEDS: [Colour; 3] = [Colour::RED, Colour::GREEN, Colour::BLUE];

/// Palette a sparkling light may turn when it draws "bright" (25 %).
const SPARKLE_BRIGHT: [Colour; 8] = [
    Colour::RED,
    Colour::GREEN,
    Colour::BLUE,
    Colour::YELLOW,
    Colour::ORANGE,
    Colour::PURPLE,
    Colour::WHITE,
    Colour::PINK,
];

/// Palette for the "dim" draw (25 %); the remaining 50 % goes dark.
const SPARKLE_DIM: [Colour; 5] = [
    Colour::DARK_RED,
    Colour::DARK_GREEN,
    Colour::DARK_BLUE,
    Colour::DARK_ORANGE,
    Colour::DARK_VIOLET,
];

/// Union-Jack approximation on the 5×5 grid, rows top to bottom.  Static —
/// the flag does not animate.
const FLAG_PATTERN: [Colour; LIGHT_COUNT] = [
    Colour::BLUE, Colour::WHITE, Colour::RED, Colour::WHITE, Colour::BLUE,
    Colour::WHITE, Colour::BLUE, Colour::RED, Colour::BLUE, Colour::WHITE,
    Colour::RED, Colour::RED, Colour::RED, Colour::RED, Colour::RED,
    Colour::WHITE, Colour::BLUE, Colour::RED, Colour::BLUE, Colour::WHITE,
    Colour::BLUE, Colour::WHITE, Colour::RED, Colour::WHITE, Colour::BLUE,
];

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

/// Per-mode frame state machine.  Pure colour maths — no hardware, no
/// shared state, no clock.
pub struct Animator {
    frame: [Colour; LIGHT_COUNT],
}

impl Animator {
    pub fn new() -> Self {
        Self {
            frame: [Colour::BLACK; LIGHT_COUNT],
        }
    }

    /// The frame to push to the hardware after a [`Animator::tick`].
    pub fn frame(&self) -> &[Colour; LIGHT_COUNT] {
        &self.frame
    }

    /// Re-seed the frame for entry into `mode`.
    ///
    /// Idempotent for the deterministic modes: transitioning into disco
    /// twice in a row produces the same initial frame both times.
    pub fn transition(&mut self, mode: Mode, rng: &mut SmallRng) {
        match mode {
            Mode::Disco | Mode::Phase => {
                // Three disjoint groups by index modulo 3, seeded
                // red/green/blue so the cycle starts from distinct colours.
                for (i, light) in self.frame.iter_mut().enumerate() {
                    *light = GROUP_SEEDS[i % 3];
                }
                self.frame[STAR_INDEX] = Colour::WHITE;
            }
            Mode::Solid(colour) => self.render_solid(colour),
            Mode::Sparkle => {
                for light in self.frame.iter_mut() {
                    *light = *SPARKLE_BRIGHT.choose(rng).unwrap();
                }
                self.frame[STAR_INDEX] = Colour::WHITE;
            }
            Mode::Flag => self.render_flag(),
            Mode::Idle => self.frame = [Colour::BLACK; LIGHT_COUNT],
        }
    }

    /// Advance one tick in `mode`.  Call after [`Animator::transition`] has
    /// seeded the current mode.
    pub fn tick(&mut self, mode: Mode, rng: &mut SmallRng) {
        match mode {
            // Disco and phase render identically on purpose; both words are
            // accepted by the grammar and the original made no visual
            // distinction between them.
            Mode::Disco | Mode::Phase => {
                for light in self.frame.iter_mut() {
                    *light = light.rotate_hue(HUE_STEP_DEGREES);
                }
                self.frame[STAR_INDEX] = Colour::WHITE;
            }
            Mode::Solid(colour) => self.render_solid(colour),
            Mode::Sparkle => {
                for light in self.frame.iter_mut() {
                    let draw: f32 = rng.gen();
                    *light = if draw < 0.25 {
                        *SPARKLE_BRIGHT.choose(rng).unwrap()
                    } else if draw < 0.5 {
                        *SPARKLE_DIM.choose(rng).unwrap()
                    } else {
                        Colour::BLACK
                    };
                }
                // Star twinkles white/gray, 70/30.
                self.frame[STAR_INDEX] = if rng.gen::<f32>() < 0.7 {
                    Colour::WHITE
                } else {
                    Colour::GRAY
                };
            }
            Mode::Flag => self.render_flag(),
            Mode::Idle => self.frame = [Colour::BLACK; LIGHT_COUNT],
        }
    }

    fn render_solid(&mut self, colour: NamedColour) {
        self.frame = [colour.colour(); LIGHT_COUNT];
        self.frame[STAR_INDEX] = if colour.is_off() {
            Colour::BLACK
        } else {
            Colour::WHITE
        };
    }

    fn render_flag(&mut self) {
        self.frame = FLAG_PATTERN;
        self.frame[STAR_INDEX] = Colour::WHITE;
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
