//! Fixed-size cell grid.
//!
//! Every frame on the canvas is a [`Grid`] of [`ROWS`] x [`COLS`] cells stored
//! row-major. Coordinates are `(row, col)` with `(0, 0)` at the top-left.
//! In pixel mode each row holds two half-pixels, giving [`PIXEL_ROWS`]
//! addressable pixel rows.

use crate::cell::Cell;

/// Canvas height in cells.
pub const ROWS: usize = 25;
/// Canvas width in cells.
pub const COLS: usize = 80;
/// Canvas height in half-block pixels.
pub const PIXEL_ROWS: usize = ROWS * 2;

/// A cell coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Convert a signed coordinate, rejecting anything off the canvas.
    #[must_use]
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < ROWS && col < COLS).then_some(Self { row, col })
    }
}

/// A 25x80 matrix of cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of blank cells.
    #[must_use]
    pub fn new() -> Self {
        Self::filled(Cell::BLANK)
    }

    /// Create a grid with every cell set to `cell`.
    #[must_use]
    pub fn filled(cell: Cell) -> Self {
        Self {
            cells: vec![cell; ROWS * COLS],
        }
    }

    /// Build a grid from row-major cells; `None` unless exactly ROWS*COLS.
    #[must_use]
    pub fn from_cells(cells: Vec<Cell>) -> Option<Self> {
        (cells.len() == ROWS * COLS).then_some(Self { cells })
    }

    #[inline]
    fn index(row: usize, col: usize) -> Option<usize> {
        if row >= ROWS || col >= COLS {
            return None;
        }
        Some(row * COLS + col)
    }

    /// Get cell at position.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        Self::index(row, col).map(|idx| &self.cells[idx])
    }

    /// Get mutable cell at position.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        Self::index(row, col).map(|idx| &mut self.cells[idx])
    }

    /// Cell at position, or blank when out of bounds.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.get(row, col).copied().unwrap_or(Cell::BLANK)
    }

    /// Set cell at position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.get_mut(row, col) {
            *slot = cell;
        }
    }

    /// Row-major cell slice.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable row-major cell slice.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Iterate rows as slices of [`COLS`] cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(COLS)
    }

    /// Iterate `(position, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (Pos::new(idx / COLS, idx % COLS), cell))
    }

    /// True if no cell has been painted.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
