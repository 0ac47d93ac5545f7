//! Canvas cell type.
//!
//! A cell is one character plus a foreground and background [`Color`].
//! Pixel-mode painting stores two stacked pseudo-pixels in one cell using the
//! upper-half-block glyph: the top pixel is the foreground, the bottom pixel
//! is the background.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::cell::{Cell, Half};
//! use ansicanvas::color::{Color, Rgb};
//!
//! let cell = Cell::BLANK.with_half(Half::Top, Color::Rgb(Rgb::RED));
//! assert!(cell.is_half_block());
//! assert_eq!(cell.halves(), (Color::Rgb(Rgb::RED), Color::Unpainted));
//! ```

use crate::color::{Color, Rgb};

/// Upper half block; top pixel = fg, bottom pixel = bg.
pub const HALF_BLOCK: char = '\u{2580}';

/// Default foreground of an unpainted cell.
pub const DEFAULT_FG: Rgb = Rgb::LIGHT_GRAY;

/// Default background of an unpainted cell.
pub const DEFAULT_BG: Rgb = Rgb::BLACK;

/// Which half of a cell a pixel occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Half {
    Top,
    Bottom,
}

impl Half {
    /// The half addressed by a half-pixel row (even rows are tops).
    #[must_use]
    pub const fn of_pixel_row(pixel_row: usize) -> Self {
        if pixel_row % 2 == 0 {
            Self::Top
        } else {
            Self::Bottom
        }
    }
}

/// A single canvas cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    /// The unpainted cell. The compositor treats it as "nothing here".
    pub const BLANK: Self = Self {
        ch: ' ',
        fg: Color::Rgb(DEFAULT_FG),
        bg: Color::Rgb(DEFAULT_BG),
    };

    /// Create an opaque cell.
    #[must_use]
    pub const fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Self {
            ch,
            fg: Color::Rgb(fg),
            bg: Color::Rgb(bg),
        }
    }

    /// Create a half-block cell from its two pixels.
    ///
    /// Two unpainted halves collapse back to [`Cell::BLANK`].
    #[must_use]
    pub const fn from_halves(top: Color, bottom: Color) -> Self {
        if matches!(top, Color::Unpainted) && matches!(bottom, Color::Unpainted) {
            return Self::BLANK;
        }
        Self {
            ch: HALF_BLOCK,
            fg: top,
            bg: bottom,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }

    #[must_use]
    pub fn is_half_block(&self) -> bool {
        self.ch == HALF_BLOCK
    }

    /// Both colors are real RGB.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.fg.is_marker() && !self.bg.is_marker()
    }

    /// The (top, bottom) pixel colors of this cell.
    ///
    /// A blank cell has two unpainted halves. Any other non-half-block glyph
    /// reads as its background on both halves.
    #[must_use]
    pub fn halves(&self) -> (Color, Color) {
        if self.is_half_block() {
            (self.fg, self.bg)
        } else if self.is_blank() {
            (Color::Unpainted, Color::Unpainted)
        } else {
            (self.bg, self.bg)
        }
    }

    /// The color of one half.
    #[must_use]
    pub fn half(&self, half: Half) -> Color {
        let (top, bottom) = self.halves();
        match half {
            Half::Top => top,
            Half::Bottom => bottom,
        }
    }

    /// Return this cell with one half repainted.
    #[must_use]
    pub fn with_half(&self, half: Half, color: Color) -> Self {
        let (top, bottom) = self.halves();
        match half {
            Half::Top => Self::from_halves(color, bottom),
            Half::Bottom => Self::from_halves(top, color),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
