//! Four-connected flood fill.

use super::{Brush, CellMap};
use crate::cell::{Cell, Half};
use crate::color::Color;
use crate::grid::{COLS, Grid, PIXEL_ROWS, Pos, ROWS};
use std::collections::VecDeque;

/// Cells written by a flood fill from `start`.
///
/// Whole-cell modes match the exact clicked cell. Pixel modes match the
/// clicked half's effective color across the half-pixel lattice. The result
/// is empty when the fill would not change the clicked point.
#[must_use]
pub fn flood_fill_cells(start: Pos, brush: &Brush, grid: &Grid) -> CellMap {
    if brush.mode.is_pixel() {
        fill_pixels(start, brush, grid)
    } else {
        fill_cells(start, brush, grid)
    }
}

fn fill_cells(start: Pos, brush: &Brush, grid: &Grid) -> CellMap {
    let mut cells = CellMap::new();
    let Some(&target) = grid.get(start.row, start.col) else {
        return cells;
    };
    let replacement = brush.cell();
    if replacement == target {
        return cells;
    }
    flood(start, ROWS, |pos| {
        if cells.contains_key(&pos) || grid.cell(pos.row, pos.col) != target {
            return false;
        }
        cells.insert(pos, replacement);
        true
    });
    cells
}

fn fill_pixels(start: Pos, brush: &Brush, grid: &Grid) -> CellMap {
    let mut cells = CellMap::new();
    if start.row >= PIXEL_ROWS || start.col >= COLS {
        return cells;
    }
    let target = pixel(grid, start);
    let replacement = brush.pixel_color(target);
    if replacement == target {
        return cells;
    }

    let mut seen = vec![false; PIXEL_ROWS * COLS];
    flood(start, PIXEL_ROWS, |p| {
        let idx = p.row * COLS + p.col;
        if seen[idx] || pixel(grid, p) != target {
            return false;
        }
        seen[idx] = true;
        let pos = Pos::new(p.row / 2, p.col);
        let half = Half::of_pixel_row(p.row);
        let base = cells
            .get(&pos)
            .copied()
            .unwrap_or_else(|| grid.cell(pos.row, pos.col));
        cells.insert(pos, base.with_half(half, replacement));
        true
    });
    cells
}

fn pixel(grid: &Grid, p: Pos) -> Color {
    let cell: Cell = grid.cell(p.row / 2, p.col);
    cell.half(Half::of_pixel_row(p.row))
}

/// Breadth-first walk over a `rows` x [`COLS`] lattice. `visit` claims a
/// point and returns whether the walk spreads from it.
fn flood(start: Pos, rows: usize, mut visit: impl FnMut(Pos) -> bool) {
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        if !visit(pos) {
            continue;
        }
        if pos.row > 0 {
            queue.push_back(Pos::new(pos.row - 1, pos.col));
        }
        if pos.row + 1 < rows {
            queue.push_back(Pos::new(pos.row + 1, pos.col));
        }
        if pos.col > 0 {
            queue.push_back(Pos::new(pos.row, pos.col - 1));
        }
        if pos.col + 1 < COLS {
            queue.push_back(Pos::new(pos.row, pos.col + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::draw::BrushMode;

    fn brush() -> Brush {
        Brush::new('#', Rgb::RED, Rgb::BLACK)
    }

    fn boxed_grid() -> Grid {
        // A 1-cell wall around rows 1..=3, cols 1..=3.
        let mut grid = Grid::new();
        let wall = Cell::new('|', Rgb::WHITE, Rgb::BLACK);
        for i in 0..5 {
            grid.set(0, i, wall);
            grid.set(4, i, wall);
            grid.set(i, 0, wall);
            grid.set(i, 4, wall);
        }
        grid
    }

    #[test]
    fn test_fill_stays_inside_wall() {
        let cells = flood_fill_cells(Pos::new(2, 2), &brush(), &boxed_grid());
        assert_eq!(cells.len(), 9);
        assert!(cells.keys().all(|p| (1..=3).contains(&p.row) && (1..=3).contains(&p.col)));
    }

    #[test]
    fn test_fill_whole_blank_canvas() {
        let cells = flood_fill_cells(Pos::new(0, 0), &brush(), &Grid::new());
        assert_eq!(cells.len(), ROWS * COLS);
    }

    #[test]
    fn test_fill_is_idempotent() {
        let mut grid = boxed_grid();
        for (pos, cell) in flood_fill_cells(Pos::new(2, 2), &brush(), &grid) {
            grid.set(pos.row, pos.col, cell);
        }
        assert!(flood_fill_cells(Pos::new(2, 2), &brush(), &grid).is_empty());
    }

    #[test]
    fn test_pixel_fill_matches_half_color() {
        let mut grid = Grid::new();
        // Top halves of row 0 are blue; bottoms stay unpainted.
        for col in 0..COLS {
            grid.set(0, col, Cell::from_halves(Color::Rgb(Rgb::BLUE), Color::Unpainted));
        }
        let brush = brush().with_mode(BrushMode::Pixel);
        let cells = flood_fill_cells(Pos::new(0, 0), &brush, &grid);
        assert_eq!(cells.len(), COLS);
        assert!(cells.values().all(|c| c.halves() == (Color::Rgb(Rgb::RED), Color::Unpainted)));
    }

    #[test]
    fn test_blend_fill_noop_when_mix_equals_target() {
        let mut grid = Grid::new();
        grid.set(0, 0, Cell::from_halves(Color::Rgb(Rgb::RED), Color::Rgb(Rgb::RED)));
        // Any ratio mixes red toward red back into red.
        let brush = brush().with_mode(BrushMode::Blend).with_blend_ratio(0.4);
        assert!(flood_fill_cells(Pos::new(0, 0), &brush, &grid).is_empty());
        // A zero ratio never changes anything.
        let brush = Brush::new('#', Rgb::GREEN, Rgb::BLACK)
            .with_mode(BrushMode::Blend)
            .with_blend_ratio(0.0);
        assert!(flood_fill_cells(Pos::new(1, 0), &brush, &grid).is_empty());
    }

    #[test]
    fn test_out_of_bounds_start_is_empty() {
        assert!(flood_fill_cells(Pos::new(25, 0), &brush(), &Grid::new()).is_empty());
        let pixel = brush().with_mode(BrushMode::Pixel);
        assert!(flood_fill_cells(Pos::new(50, 0), &pixel, &Grid::new()).is_empty());
    }
}
