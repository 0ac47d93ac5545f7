//! Drawing algorithms.
//!
//! Every function here is pure: it reads the target [`Grid`] and returns a
//! sparse [`CellMap`] of cells to write, leaving the grid untouched. Callers
//! apply the map with [`LayerTree::apply_cells`](crate::layer::LayerTree::apply_cells).
//!
//! In [`BrushMode::Pixel`] and [`BrushMode::Blend`], the `row` of every
//! [`Pos`] argument addresses a half-pixel row (`0..PIXEL_ROWS`); each cell
//! holds two of them. Other modes address whole cells.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::draw::{Brush, line_cells};
//! use ansicanvas::grid::{Grid, Pos};
//! use ansicanvas::Rgb;
//!
//! let brush = Brush::new('*', Rgb::WHITE, Rgb::BLACK);
//! let cells = line_cells(Pos::new(0, 0), Pos::new(0, 4), &brush, &Grid::new());
//! assert_eq!(cells.len(), 5);
//! ```

mod border;
mod fill;
mod line;
mod shape;

pub use border::{BorderSides, BorderStyle, border_cells};
pub use fill::flood_fill_cells;
pub use line::{bresenham, line_cells};
pub use shape::{Shape, shape_cells};

use crate::cell::{Cell, DEFAULT_BG, Half};
use crate::color::{Color, Rgb};
use crate::grid::{COLS, Grid, PIXEL_ROWS, Pos, ROWS};
use std::collections::BTreeMap;

/// Sparse set of cell writes keyed by position.
pub type CellMap = BTreeMap<Pos, Cell>;

/// Default share of the brush color in blend mode.
pub const DEFAULT_BLEND_RATIO: f32 = 0.25;

/// How a brush puts color down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BrushMode {
    /// Whole cells with the brush character and colors.
    #[default]
    Brush,
    /// Half-block pixels in the brush foreground.
    Pixel,
    /// Half-block pixels mixed from the existing color toward the brush.
    Blend,
    /// Whole cells reset to blank.
    Eraser,
}

impl BrushMode {
    /// Pixel-lattice modes address half rows.
    #[must_use]
    pub fn is_pixel(self) -> bool {
        matches!(self, Self::Pixel | Self::Blend)
    }
}

/// Brush settings shared by every drawing algorithm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
    pub mode: BrushMode,
    blend_ratio: f32,
}

impl Brush {
    #[must_use]
    pub fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Self {
            ch,
            fg,
            bg,
            mode: BrushMode::Brush,
            blend_ratio: DEFAULT_BLEND_RATIO,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: BrushMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the blend ratio, clamped to `[0, 1]`. NaN becomes 0.
    #[must_use]
    pub fn with_blend_ratio(mut self, ratio: f32) -> Self {
        self.blend_ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        self
    }

    #[must_use]
    pub fn blend_ratio(&self) -> f32 {
        self.blend_ratio
    }

    /// The cell a whole-cell mode writes.
    #[must_use]
    pub fn cell(&self) -> Cell {
        match self.mode {
            BrushMode::Eraser => Cell::BLANK,
            _ => Cell::new(self.ch, self.fg, self.bg),
        }
    }

    /// The color a pixel mode writes over `existing`.
    #[must_use]
    pub fn pixel_color(&self, existing: Color) -> Color {
        match self.mode {
            BrushMode::Blend => {
                Color::Rgb(existing.or(DEFAULT_BG).lerp(self.fg, self.blend_ratio))
            }
            _ => Color::Rgb(self.fg),
        }
    }
}

/// The cell currently at `pos`, preferring a pending write over the grid.
pub(crate) fn pending(cells: &CellMap, grid: &Grid, pos: Pos) -> Cell {
    cells
        .get(&pos)
        .copied()
        .unwrap_or_else(|| grid.cell(pos.row, pos.col))
}

/// Paint one lattice point in the brush's mode.
///
/// Pixel modes compose with whatever is already pending for the cell, so
/// two halves of one cell written by the same gesture both survive.
pub(crate) fn stamp(cells: &mut CellMap, grid: &Grid, brush: &Brush, row: i32, col: i32) {
    let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
        return;
    };
    if col >= COLS {
        return;
    }
    if brush.mode.is_pixel() {
        if row >= PIXEL_ROWS {
            return;
        }
        let pos = Pos::new(row / 2, col);
        let half = Half::of_pixel_row(row);
        let base = pending(cells, grid, pos);
        let color = brush.pixel_color(base.half(half));
        cells.insert(pos, base.with_half(half, color));
    } else if row < ROWS {
        cells.insert(Pos::new(row, col), brush.cell());
    }
}

/// Rows available in the brush's lattice.
pub(crate) fn lattice_rows(brush: &Brush) -> usize {
    if brush.mode.is_pixel() { PIXEL_ROWS } else { ROWS }
}
