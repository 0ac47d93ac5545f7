//! Bottom-to-top layer compositing.
//!
//! Layers are folded from the bottom of the stack upwards with
//! [`merge_cell`], starting from [`Cell::BLANK`]. A painted cell hides what
//! is below it, except where it carries a marker color:
//!
//! - [`Color::Unpainted`] halves of a half-block cell show the half beneath.
//! - A [`Color::Transparent`] (or unpainted) background on a glyph takes the
//!   background beneath, so text floats over lower layers.
//! - A text-layer space with a see-through background paints nothing.
//!
//! Whatever markers survive the fold are replaced by the canvas defaults in
//! [`resolve`], so the result never contains one.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::composite::composite;
//! use ansicanvas::layer::LayerTree;
//! use ansicanvas::{Cell, Rgb};
//!
//! let mut tree = LayerTree::new();
//! tree.apply_to_active_layer(0, 0, Cell::new('@', Rgb::RED, Rgb::BLUE));
//! let grid = composite(tree.layers());
//! assert_eq!(grid.cell(0, 0).ch, '@');
//! assert_eq!(grid.cell(1, 1), Cell::BLANK);
//! ```

use crate::cell::{Cell, DEFAULT_BG, DEFAULT_FG};
use crate::color::Color;
use crate::grid::Grid;
use crate::layer::{Layer, effective_visibility};

/// Place `top` over `below`, leaving markers for later resolution.
#[must_use]
pub fn merge_cell(top: Cell, below: Cell) -> Cell {
    if top.is_blank() || (top.ch == ' ' && top.bg.is_marker()) {
        return below;
    }
    if below.is_blank() {
        return top;
    }
    if top.is_half_block() {
        let (top_hi, top_lo) = top.halves();
        let (below_hi, below_lo) = below.halves();
        return Cell::from_halves(see_through(top_hi, below_hi), see_through(top_lo, below_lo));
    }
    Cell {
        bg: see_through(top.bg, below.bg),
        ..top
    }
}

#[inline]
fn see_through(color: Color, below: Color) -> Color {
    if color.is_marker() { below } else { color }
}

/// Replace leftover markers with the canvas defaults.
///
/// Half-block pixels that nothing painted show the default background on
/// both halves; glyph foregrounds fall back to the default foreground.
#[must_use]
pub fn resolve(cell: Cell) -> Cell {
    let fg_default = if cell.is_half_block() {
        DEFAULT_BG
    } else {
        DEFAULT_FG
    };
    Cell {
        ch: cell.ch,
        fg: Color::Rgb(cell.fg.or(fg_default)),
        bg: Color::Rgb(cell.bg.or(DEFAULT_BG)),
    }
}

/// Flatten the effectively visible layers into one display grid.
#[must_use]
pub fn composite(layers: &[Layer]) -> Grid {
    let visible = effective_visibility(layers);
    let mut acc = Grid::new();
    for (layer, _) in layers.iter().zip(visible).filter(|(_, shown)| *shown) {
        let Some(grid) = layer.grid() else {
            continue;
        };
        for (slot, &top) in acc.cells_mut().iter_mut().zip(grid.cells()) {
            *slot = merge_cell(top, *slot);
        }
    }
    for slot in acc.cells_mut() {
        *slot = resolve(*slot);
    }
    acc
}

/// Composite a single position. Always equal to `composite(layers).cell(row, col)`.
#[must_use]
pub fn composite_cell(layers: &[Layer], row: usize, col: usize) -> Cell {
    let visible = effective_visibility(layers);
    let merged = layers
        .iter()
        .zip(visible)
        .filter(|(_, shown)| *shown)
        .filter_map(|(layer, _)| layer.cell(row, col))
        .fold(Cell::BLANK, |below, top| merge_cell(top, below));
    resolve(merged)
}
