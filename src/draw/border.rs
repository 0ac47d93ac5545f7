//! Box-drawing borders.

use super::line::lattice;
use super::shape::{BoundingBox, rect_points};
use super::{Brush, BrushMode, CellMap, lattice_rows, stamp};
use crate::cell::Cell;
use crate::grid::{Grid, Pos};
use bitflags::bitflags;

bitflags! {
    /// Which edges of a border are drawn.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct BorderSides: u8 {
        const TOP    = 0x01;
        const RIGHT  = 0x02;
        const BOTTOM = 0x04;
        const LEFT   = 0x08;
    }
}

impl Default for BorderSides {
    fn default() -> Self {
        Self::all()
    }
}

/// Corner and edge glyphs of a border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BorderStyle {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub sides: BorderSides,
}

impl BorderStyle {
    /// Single-line box drawing characters.
    #[must_use]
    pub const fn single() -> Self {
        Self::with_glyphs(['┌', '┐', '└', '┘', '─', '│'])
    }

    /// Double-line box drawing characters.
    #[must_use]
    pub const fn double() -> Self {
        Self::with_glyphs(['╔', '╗', '╚', '╝', '═', '║'])
    }

    /// Rounded corner box drawing characters.
    #[must_use]
    pub const fn rounded() -> Self {
        Self::with_glyphs(['╭', '╮', '╰', '╯', '─', '│'])
    }

    /// Heavy (bold) box drawing characters.
    #[must_use]
    pub const fn heavy() -> Self {
        Self::with_glyphs(['┏', '┓', '┗', '┛', '━', '┃'])
    }

    /// ASCII box drawing characters (works in all terminals).
    #[must_use]
    pub const fn ascii() -> Self {
        Self::with_glyphs(['+', '+', '+', '+', '-', '|'])
    }

    const fn with_glyphs(g: [char; 6]) -> Self {
        Self {
            top_left: g[0],
            top_right: g[1],
            bottom_left: g[2],
            bottom_right: g[3],
            horizontal: g[4],
            vertical: g[5],
            sides: BorderSides::all(),
        }
    }

    #[must_use]
    pub const fn with_sides(mut self, sides: BorderSides) -> Self {
        self.sides = sides;
        self
    }

    /// Glyph for one point of a `w` x `h` box, or `None` if its edge is off.
    fn glyph(&self, dr: i32, dc: i32, w: i32, h: i32) -> Option<char> {
        if w == 1 && h == 1 {
            return Some(self.top_left);
        }
        if h == 1 {
            return Some(self.horizontal);
        }
        if w == 1 {
            return Some(self.vertical);
        }
        let top = dr == 0;
        let bottom = dr == h - 1;
        let left = dc == 0;
        let right = dc == w - 1;
        let has = |side| self.sides.contains(side);

        let corner = |h_side, v_side, glyph| match (has(h_side), has(v_side)) {
            (true, true) => Some(glyph),
            (true, false) => Some(self.horizontal),
            (false, true) => Some(self.vertical),
            (false, false) => None,
        };
        match (top, bottom, left, right) {
            (true, _, true, _) => corner(BorderSides::TOP, BorderSides::LEFT, self.top_left),
            (true, _, _, true) => corner(BorderSides::TOP, BorderSides::RIGHT, self.top_right),
            (_, true, true, _) => corner(BorderSides::BOTTOM, BorderSides::LEFT, self.bottom_left),
            (_, true, _, true) => corner(BorderSides::BOTTOM, BorderSides::RIGHT, self.bottom_right),
            (true, ..) => has(BorderSides::TOP).then_some(self.horizontal),
            (_, true, ..) => has(BorderSides::BOTTOM).then_some(self.horizontal),
            (_, _, true, _) => has(BorderSides::LEFT).then_some(self.vertical),
            (_, _, _, true) => has(BorderSides::RIGHT).then_some(self.vertical),
            _ => None,
        }
    }
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self::single()
    }
}

/// Cells written by a border spanning `start` and `end`.
///
/// Pixel, blend and eraser brushes draw a plain rectangle outline instead,
/// since box glyphs only make sense as whole-cell characters.
#[must_use]
pub fn border_cells(start: Pos, end: Pos, brush: &Brush, grid: &Grid, style: &BorderStyle) -> CellMap {
    let bounds = BoundingBox::new(lattice(start), lattice(end), lattice_rows(brush));
    let mut cells = CellMap::new();

    if brush.mode != BrushMode::Brush {
        for (row, col) in rect_points(&bounds, false) {
            stamp(&mut cells, grid, brush, row, col);
        }
        return cells;
    }

    let w = bounds.c1 - bounds.c0 + 1;
    let h = bounds.r1 - bounds.r0 + 1;
    for (row, col) in rect_points(&bounds, false) {
        let Some(ch) = style.glyph(row - bounds.r0, col - bounds.c0, w, h) else {
            continue;
        };
        let (Ok(r), Ok(c)) = (usize::try_from(row), usize::try_from(col)) else {
            continue;
        };
        cells.insert(Pos::new(r, c), Cell::new(ch, brush.fg, brush.bg));
    }
    cells
}
