//! Colour model for the LED tree.
//!
//! Two layers:
//!
//! * [`Colour`] — a linear RGB triple with `f32` components in `[0, 1]`,
//!   convertible to 8-bit for hardware, with HSV-based hue rotation for the
//!   disco/phase animations.
//! * [`NamedColour`] — the closed set of colour words the voice grammar
//!   accepts.  Each maps to its CSS3 value (notably `green` is `#008000`,
//!   not full-brightness `#00FF00`).
//!
//! Greys (white, gray, black) have zero saturation and are fixed points of
//! hue rotation.

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// An RGB colour with components in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    // CSS3 values for the palette the animations draw from.
    pub const RED: Colour = Colour::new(1.0, 0.0, 0.0);
    pub const GREEN: Colour = Colour::new(0.0, 0.502, 0.0);
    pub const BLUE: Colour = Colour::new(0.0, 0.0, 1.0);
    pub const YELLOW: Colour = Colour::new(1.0, 1.0, 0.0);
    pub const ORANGE: Colour = Colour::new(1.0, 0.647, 0.0);
    pub const PURPLE: Colour = Colour::new(0.502, 0.0, 0.502);
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);
    pub const PINK: Colour = Colour::new(1.0, 0.753, 0.796);
    pub const BROWN: Colour = Colour::new(0.647, 0.165, 0.165);
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0);
    pub const GRAY: Colour = Colour::new(0.502, 0.502, 0.502);
    pub const DARK_RED: Colour = Colour::new(0.545, 0.0, 0.0);
    pub const DARK_GREEN: Colour = Colour::new(0.0, 0.392, 0.0);
    pub const DARK_BLUE: Colour = Colour::new(0.0, 0.0, 0.545);
    pub const DARK_ORANGE: Colour = Colour::new(1.0, 0.549, 0.0);
    pub const DARK_VIOLET: Colour = Colour::new(0.58, 0.0, 0.827);

    /// Construct a colour from float components.  Values are used as-is;
    /// callers are expected to stay in `[0, 1]`.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Construct a colour from 8-bit components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Convert to 8-bit components (clamped), for the hardware boundary.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }

    /// Rotate the hue by `degrees` (may be negative; wraps at 360).
    ///
    /// Saturation and value are preserved, so achromatic colours (white,
    /// gray, black) come back unchanged.
    ///
    /// ```
    /// use voice_tree::lights::Colour;
    ///
    /// let c = Colour::RED.rotate_hue(120.0);
    /// assert!((c.g - 1.0).abs() < 1e-4); // red -> full green hue
    /// assert_eq!(Colour::WHITE.rotate_hue(90.0), Colour::WHITE);
    /// ```
    pub fn rotate_hue(self, degrees: f32) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv((h + degrees).rem_euclid(360.0), s, v)
    }

    /// RGB -> HSV.  Hue in `[0, 360)`, saturation and value in `[0, 1]`.
    fn to_hsv(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;

        let hue = if delta <= f32::EPSILON {
            0.0
        } else if max == self.r {
            60.0 * ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            60.0 * ((self.b - self.r) / delta + 2.0)
        } else {
            60.0 * ((self.r - self.g) / delta + 4.0)
        };

        let saturation = if max <= f32::EPSILON { 0.0 } else { delta / max };
        (hue, saturation, max)
    }

    /// HSV -> RGB.  `hue` must already be in `[0, 360)`.
    fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let chroma = value * saturation;
        let sector = (hue / 60.0).rem_euclid(6.0);
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());

        let (r1, g1, b1) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let m = value - chroma;
        Self::new(r1 + m, g1 + m, b1 + m)
    }
}

// ---------------------------------------------------------------------------
// NamedColour
// ---------------------------------------------------------------------------

/// The colour words the voice grammar accepts as solid-colour modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColour {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
    White,
    Pink,
    Brown,
    Black,
}

impl NamedColour {
    /// Every supported colour, in grammar order.
    pub const ALL: [NamedColour; 10] = [
        NamedColour::Red,
        NamedColour::Green,
        NamedColour::Blue,
        NamedColour::Yellow,
        NamedColour::Orange,
        NamedColour::Purple,
        NamedColour::White,
        NamedColour::Pink,
        NamedColour::Brown,
        NamedColour::Black,
    ];

    /// The lowercase word used in voice commands and log lines.
    pub fn word(self) -> &'static str {
        match self {
            NamedColour::Red => "red",
            NamedColour::Green => "green",
            NamedColour::Blue => "blue",
            NamedColour::Yellow => "yellow",
            NamedColour::Orange => "orange",
            NamedColour::Purple => "purple",
            NamedColour::White => "white",
            NamedColour::Pink => "pink",
            NamedColour::Brown => "brown",
            NamedColour::Black => "black",
        }
    }

    /// Parse a colour word (case-insensitive).  Returns `None` for anything
    /// outside the supported set.
    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.word() == word)
    }

    /// The RGB value this word renders as.
    pub fn colour(self) -> Colour {
        match self {
            NamedColour::Red => Colour::RED,
            NamedColour::Green => Colour::GREEN,
            NamedColour::Blue => Colour::BLUE,
            NamedColour::Yellow => Colour::YELLOW,
            NamedColour::Orange => Colour::ORANGE,
            NamedColour::Purple => Colour::PURPLE,
            NamedColour::White => Colour::WHITE,
            NamedColour::Pink => Colour::PINK,
            NamedColour::Brown => Colour::BROWN,
            NamedColour::Black => Colour::BLACK,
        }
    }

    /// `true` for the one colour that means "lights off".
    ///
    /// The star LED follows this: it stays white for every solid colour
    /// except black, where it goes dark too.
    pub fn is_off(self) -> bool {
        self == NamedColour::Black
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Colour, b: Colour) -> bool {
        (a.r - b.r).abs() < 1e-3 && (a.g - b.g).abs() < 1e-3 && (a.b - b.b).abs() < 1e-3
    }

    // ---- named colours -----------------------------------------------------

    #[test]
    fn every_word_round_trips() {
        for named in NamedColour::ALL {
            assert_eq!(NamedColour::from_word(named.word()), Some(named));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(NamedColour::from_word("RED"), Some(NamedColour::Red));
        assert_eq!(NamedColour::from_word(" Purple "), Some(NamedColour::Purple));
    }

    #[test]
    fn unknown_word_is_none() {
        assert_eq!(NamedColour::from_word("chartreuse"), None);
        assert_eq!(NamedColour::from_word(""), None);
    }

    #[test]
    fn green_is_css_green_not_lime() {
        // CSS3 "green" is half-brightness #008000.
        let (r, g, b) = NamedColour::Green.colour().to_rgb8();
        assert_eq!((r, g, b), (0, 128, 0));
    }

    #[test]
    fn only_black_is_off() {
        assert!(NamedColour::Black.is_off());
        for named in NamedColour::ALL {
            if named != NamedColour::Black {
                assert!(!named.is_off(), "{} should not be off", named.word());
            }
        }
    }

    // ---- 8-bit conversion --------------------------------------------------

    #[test]
    fn rgb8_round_trip() {
        let c = Colour::from_rgb8(255, 128, 0);
        assert_eq!(c.to_rgb8(), (255, 128, 0));
    }

    #[test]
    fn to_rgb8_clamps_out_of_range() {
        let c = Colour::new(1.5, -0.2, 0.5);
        assert_eq!(c.to_rgb8(), (255, 0, 128));
    }

    // ---- hue rotation ------------------------------------------------------

    #[test]
    fn rotate_red_by_120_gives_green_hue() {
        let c = Colour::RED.rotate_hue(120.0);
        assert!(approx(c, Colour::new(0.0, 1.0, 0.0)), "got {c:?}");
    }

    #[test]
    fn rotate_red_by_240_gives_blue() {
        let c = Colour::RED.rotate_hue(240.0);
        assert!(approx(c, Colour::BLUE), "got {c:?}");
    }

    #[test]
    fn thirty_six_small_steps_return_to_start() {
        // The disco animation advances 10 degrees per tick; a full lap must
        // land back on the seed colour without drift.
        let mut c = Colour::ORANGE;
        for _ in 0..36 {
            c = c.rotate_hue(10.0);
        }
        assert!(approx(c, Colour::ORANGE), "got {c:?}");
    }

    #[test]
    fn achromatic_colours_are_fixed_points() {
        for c in [Colour::WHITE, Colour::GRAY, Colour::BLACK] {
            assert!(approx(c.rotate_hue(10.0), c));
            assert!(approx(c.rotate_hue(187.5), c));
        }
    }

    #[test]
    fn rotation_preserves_value() {
        // CSS green keeps its half brightness while cycling.
        let rotated = Colour::GREEN.rotate_hue(90.0);
        let max = rotated.r.max(rotated.g).max(rotated.b);
        assert!((max - 0.502).abs() < 1e-3, "value drifted to {max}");
    }

    #[test]
    fn negative_rotation_wraps() {
        let left = Colour::RED.rotate_hue(-120.0);
        let right = Colour::RED.rotate_hue(240.0);
        assert!(approx(left, right));
    }
}
