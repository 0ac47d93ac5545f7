//! Grid diffing for minimal terminal updates.

use crate::cell::{Cell, DEFAULT_BG, DEFAULT_FG};
use crate::color::{Color, ColorTransform};
use crate::grid::{COLS, Grid, Pos};

/// A horizontal run of changed cells on one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRegion {
    pub row: usize,
    pub col: usize,
    pub width: usize,
}

impl DirtyRegion {
    #[must_use]
    pub fn new(row: usize, col: usize, width: usize) -> Self {
        Self { row, col, width }
    }

    /// Positions covered by this run, left to right.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (self.col..self.col + self.width).map(|col| Pos::new(self.row, col))
    }
}

/// Result of diffing two grids as they would appear on screen.
#[derive(Clone, Debug, Default)]
pub struct GridDiff {
    /// Changed positions in row-major order.
    pub changed_cells: Vec<Pos>,
    /// Changed positions merged into per-row runs.
    pub dirty_regions: Vec<DirtyRegion>,
    /// Total number of changed cells.
    pub change_count: usize,
}

impl GridDiff {
    /// Compare two grids after applying `transform` to both.
    #[must_use]
    pub fn compute(old: &Grid, new: &Grid, transform: Option<&dyn ColorTransform>) -> Self {
        let changed_cells: Vec<Pos> = old
            .cells()
            .iter()
            .zip(new.cells())
            .enumerate()
            .filter(|(_, (a, b))| rendered(a, transform) != rendered(b, transform))
            .map(|(idx, _)| Pos::new(idx / COLS, idx % COLS))
            .collect();
        Self::from_changed(changed_cells)
    }

    /// Every position of the grid, for a full repaint.
    #[must_use]
    pub fn full() -> Self {
        Self::from_changed(Grid::new().iter().map(|(pos, _)| pos).collect())
    }

    fn from_changed(changed_cells: Vec<Pos>) -> Self {
        let dirty_regions = merge_into_regions(&changed_cells);
        Self {
            change_count: changed_cells.len(),
            changed_cells,
            dirty_regions,
        }
    }

    /// Check if there are any changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_cells.is_empty()
    }
}

/// How a cell reaches the screen: markers resolved, colors transformed.
#[must_use]
pub fn rendered(cell: &Cell, transform: Option<&dyn ColorTransform>) -> Cell {
    let apply = |color: Color, fallback| {
        let rgb = color.or(fallback);
        Color::Rgb(transform.map_or(rgb, |t| t.apply(rgb)))
    };
    Cell {
        ch: cell.ch,
        fg: apply(cell.fg, DEFAULT_FG),
        bg: apply(cell.bg, DEFAULT_BG),
    }
}

/// Group row-major positions into contiguous per-row runs.
fn merge_into_regions(cells: &[Pos]) -> Vec<DirtyRegion> {
    let mut regions: Vec<DirtyRegion> = Vec::new();
    for pos in cells {
        match regions.last_mut() {
            Some(run) if run.row == pos.row && run.col + run.width == pos.col => run.width += 1,
            _ => regions.push(DirtyRegion::new(pos.row, pos.col, 1)),
        }
    }
    regions
}
