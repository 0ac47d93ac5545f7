//! Canvas colors.
//!
//! Painted colors are always 24-bit [`Rgb`]. A layer cell may also carry one
//! of two transparency markers, modelled as [`Color`] variants instead of
//! out-of-range RGB triples:
//!
//! - [`Color::Unpainted`]: a half-block pixel nobody has painted yet. The
//!   compositor lets whatever is beneath show through.
//! - [`Color::Transparent`]: the background of a text layer glyph. The
//!   compositor substitutes the background of the layers beneath.
//!
//! Neither marker survives compositing, so the renderer only ever sees RGB.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::color::{Color, Rgb};
//!
//! let orange = Rgb::from_hex("#ff8000").unwrap();
//! let blended = Rgb::BLACK.lerp(orange, 0.5);
//! assert_eq!(blended, Rgb::new(128, 64, 0));
//!
//! assert!(Color::Unpainted.rgb().is_none());
//! ```

use std::fmt;

/// An opaque 24-bit color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Classic VGA light gray, the canvas' default foreground.
    pub const LIGHT_GRAY: Self = Self::new(170, 170, 170);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string (e.g., "#FF0000", "FF0000" or "#F00").
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Linearly interpolate towards `other`; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Squared Euclidean distance in RGB space.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let d = i32::from(a) - i32::from(b);
            (d * d) as u32
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }

    /// Convert to nearest 256-color palette index.
    ///
    /// Uses the 6x6x6 color cube (colors 16-231) or grayscale ramp (232-255)
    /// depending on which provides the closest match.
    #[must_use]
    pub fn to_256_color(self) -> u8 {
        let Self { r, g, b } = self;

        let gray = ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8;
        let is_grayscale = (i16::from(r) - i16::from(gray)).abs() < 10
            && (i16::from(g) - i16::from(gray)).abs() < 10
            && (i16::from(b) - i16::from(gray)).abs() < 10;

        if is_grayscale {
            let gray_idx = (u16::from(gray) * 24 / 256) as u8;
            return 232 + gray_idx.min(23);
        }

        let ri = nearest_cube_index(r);
        let gi = nearest_cube_index(g);
        let bi = nearest_cube_index(b);

        16 + 36 * ri + 6 * gi + bi
    }

    /// Convert to nearest 16-color (basic ANSI) palette index.
    #[must_use]
    pub fn to_16_color(self) -> u8 {
        let mut best_idx = 0;
        let mut min_dist = u32::MAX;

        for (i, &entry) in ANSI_16.iter().enumerate() {
            let dist = self.distance_sq(entry);
            if dist < min_dist {
                min_dist = dist;
                best_idx = i;
            }
        }

        best_idx as u8
    }

    /// The RGB value of a 256-color palette index.
    #[must_use]
    pub fn from_256_color(index: u8) -> Self {
        match index {
            0..=15 => ANSI_16[index as usize],
            16..=231 => {
                let idx = index - 16;
                let cube_values: [u8; 6] = [0, 95, 135, 175, 215, 255];
                Self::new(
                    cube_values[(idx / 36 % 6) as usize],
                    cube_values[(idx / 6 % 6) as usize],
                    cube_values[(idx % 6) as usize],
                )
            }
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                Self::new(gray, gray, gray)
            }
        }
    }
}

/// Standard ANSI palette (approximate values).
#[rustfmt::skip]
const ANSI_16: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // 0 Black
    Rgb::new(128, 0, 0),     // 1 Red
    Rgb::new(0, 128, 0),     // 2 Green
    Rgb::new(128, 128, 0),   // 3 Yellow
    Rgb::new(0, 0, 128),     // 4 Blue
    Rgb::new(128, 0, 128),   // 5 Magenta
    Rgb::new(0, 128, 128),   // 6 Cyan
    Rgb::new(192, 192, 192), // 7 White
    Rgb::new(128, 128, 128), // 8 Bright Black
    Rgb::new(255, 0, 0),     // 9 Bright Red
    Rgb::new(0, 255, 0),     // 10 Bright Green
    Rgb::new(255, 255, 0),   // 11 Bright Yellow
    Rgb::new(0, 0, 255),     // 12 Bright Blue
    Rgb::new(255, 0, 255),   // 13 Bright Magenta
    Rgb::new(0, 255, 255),   // 14 Bright Cyan
    Rgb::new(255, 255, 255), // 15 Bright White
];

/// Find the nearest index in the 6x6x6 cube for a component value.
///
/// The cube values are [0, 95, 135, 175, 215, 255] with boundaries
/// at midpoints: 48, 115, 155, 195, 235.
#[inline]
fn nearest_cube_index(val: u8) -> u8 {
    match val {
        0..=47 => 0,
        48..=114 => 1,
        115..=154 => 2,
        155..=194 => 3,
        195..=234 => 4,
        _ => 5,
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A layer-level color: either real RGB or a transparency marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Rgb(Rgb),
    /// Half-block pixel that has never been painted.
    Unpainted,
    /// Text-layer background; shows the layers beneath.
    Transparent,
}

impl Color {
    #[must_use]
    pub const fn rgb(self) -> Option<Rgb> {
        match self {
            Self::Rgb(rgb) => Some(rgb),
            Self::Unpainted | Self::Transparent => None,
        }
    }

    /// True for either transparency marker.
    #[must_use]
    pub const fn is_marker(self) -> bool {
        !matches!(self, Self::Rgb(_))
    }

    /// Resolve markers to `fallback`.
    #[must_use]
    pub const fn or(self, fallback: Rgb) -> Rgb {
        match self {
            Self::Rgb(rgb) => rgb,
            Self::Unpainted | Self::Transparent => fallback,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::Rgb(Rgb::BLACK)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

/// A display-time color mapping applied by the renderer, such as palette
/// quantization for terminals without truecolor.
pub trait ColorTransform {
    fn apply(&self, color: Rgb) -> Rgb;
}

impl<F> ColorTransform for F
where
    F: Fn(Rgb) -> Rgb,
{
    fn apply(&self, color: Rgb) -> Rgb {
        self(color)
    }
}

/// Nearest-palette quantization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantize {
    /// xterm 256-color palette.
    Xterm256,
    /// Basic 16-color ANSI palette.
    Ansi16,
}

impl ColorTransform for Quantize {
    fn apply(&self, color: Rgb) -> Rgb {
        match self {
            Self::Xterm256 => Rgb::from_256_color(color.to_256_color()),
            Self::Ansi16 => ANSI_16[color.to_16_color() as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#FF0000"), Some(Rgb::RED));
        assert_eq!(Rgb::from_hex("00FF00"), Some(Rgb::GREEN));
        assert_eq!(Rgb::from_hex("#00F"), Some(Rgb::BLUE));
        assert_eq!(Rgb::from_hex("#12"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
        assert_eq!(Rgb::from_hex("#ééé"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgb::new(255, 128, 0).to_string(), "#FF8000");
    }

    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, -3.0), a);
        assert_eq!(a.lerp(b, 7.0), b);
        assert_eq!(a.lerp(b, f32::NAN), a);
    }

    #[test]
    fn test_lerp_quarter() {
        let blended = Rgb::BLACK.lerp(Rgb::new(200, 100, 40), 0.25);
        assert_eq!(blended, Rgb::new(50, 25, 10));
    }

    #[test]
    fn test_to_256_color() {
        assert_eq!(Rgb::RED.to_256_color(), 196);
        assert_eq!(Rgb::BLACK.to_256_color(), 232);
        assert_eq!(Rgb::from_256_color(196), Rgb::RED);
    }

    #[test]
    fn test_to_16_color() {
        assert_eq!(Rgb::BLACK.to_16_color(), 0);
        assert_eq!(Rgb::RED.to_16_color(), 9);
        assert_eq!(Rgb::new(250, 250, 250).to_16_color(), 15);
    }

    #[test]
    fn test_quantize_is_idempotent() {
        let c = Rgb::new(123, 45, 210);
        for q in [Quantize::Xterm256, Quantize::Ansi16] {
            let once = q.apply(c);
            assert_eq!(q.apply(once), once);
        }
    }

    #[test]
    fn test_closure_transform() {
        let invert = |c: Rgb| Rgb::new(255 - c.r, 255 - c.g, 255 - c.b);
        assert_eq!(invert.apply(Rgb::BLACK), Rgb::WHITE);
    }

    #[test]
    fn test_color_markers() {
        assert_eq!(Color::Rgb(Rgb::RED).rgb(), Some(Rgb::RED));
        assert!(Color::Unpainted.is_marker());
        assert!(Color::Transparent.is_marker());
        assert_eq!(Color::Transparent.or(Rgb::BLUE), Rgb::BLUE);
        assert_eq!(Color::from(Rgb::GREEN).or(Rgb::BLUE), Rgb::GREEN);
    }
}
