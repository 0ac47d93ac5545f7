//! Bresenham line rasterization.

use super::{Brush, CellMap, lattice_rows, stamp};
use crate::grid::{COLS, Grid, Pos};

/// Coordinates past this are far off any lattice; they saturate here so the
/// integer math in the rasterizers stays small.
const LATTICE_LIMIT: i32 = 1 << 16;

/// Lattice points from `from` to `to` inclusive, as `(row, col)`.
#[must_use]
pub fn bresenham(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
    let (mut row, mut col) = from;
    let (row1, col1) = to;
    let d_col = (i64::from(col1) - i64::from(col)).abs();
    let d_row = -(i64::from(row1) - i64::from(row)).abs();
    let step_col = if col < col1 { 1 } else { -1 };
    let step_row = if row < row1 { 1 } else { -1 };
    let mut err = d_col + d_row;

    let mut points = Vec::with_capacity(usize::try_from(d_col.max(-d_row) + 1).unwrap_or(0));
    loop {
        points.push((row, col));
        if row == row1 && col == col1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= d_row {
            err += d_row;
            col += step_col;
        }
        if e2 <= d_col {
            err += d_col;
            row += step_row;
        }
    }
    points
}

/// Cells written by a straight stroke from `start` to `end`.
#[must_use]
pub fn line_cells(start: Pos, end: Pos, brush: &Brush, grid: &Grid) -> CellMap {
    let mut cells = CellMap::new();
    let max_row = i32::try_from(lattice_rows(brush)).unwrap_or(LATTICE_LIMIT) - 1;
    let Some((from, to)) = clip(lattice(start), lattice(end), max_row, COLS as i32 - 1) else {
        return cells;
    };
    for (row, col) in bresenham(from, to) {
        stamp(&mut cells, grid, brush, row, col);
    }
    cells
}

pub(super) fn lattice(pos: Pos) -> (i32, i32) {
    let saturate = |v: usize| i32::try_from(v).map_or(LATTICE_LIMIT, |v| v.min(LATTICE_LIMIT));
    (saturate(pos.row), saturate(pos.col))
}

/// Cut the segment down to the part inside `[0, max_row] x [0, max_col]`
/// (Liang-Barsky). Segments already inside come back unchanged; segments
/// that miss the box entirely give `None`.
fn clip(
    from: (i32, i32),
    to: (i32, i32),
    max_row: i32,
    max_col: i32,
) -> Option<((i32, i32), (i32, i32))> {
    let inside = |(row, col): (i32, i32)| (0..=max_row).contains(&row) && (0..=max_col).contains(&col);
    if inside(from) && inside(to) {
        return Some((from, to));
    }

    let (r0, c0) = (f64::from(from.0), f64::from(from.1));
    let (dr, dc) = (f64::from(to.0) - r0, f64::from(to.1) - c0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dc, c0),
        (dc, f64::from(max_col) - c0),
        (-dr, r0),
        (dr, f64::from(max_row) - r0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        let row = (r0 + t * dr).round() as i32;
        let col = (c0 + t * dc).round() as i32;
        (row.clamp(0, max_row), col.clamp(0, max_col))
    };
    Some((at(t0), at(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::color::{Color, Rgb};
    use crate::draw::BrushMode;

    fn brush() -> Brush {
        Brush::new('*', Rgb::WHITE, Rgb::BLACK)
    }

    #[test]
    fn test_zero_length_line_is_one_cell() {
        let cells = line_cells(Pos::new(3, 3), Pos::new(3, 3), &brush(), &Grid::new());
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[&Pos::new(3, 3)], Cell::new('*', Rgb::WHITE, Rgb::BLACK));
    }

    #[test]
    fn test_bresenham_endpoints_and_connectivity() {
        let points = bresenham((0, 0), (3, 7));
        assert_eq!(points.first(), Some(&(0, 0)));
        assert_eq!(points.last(), Some(&(3, 7)));
        assert_eq!(points.len(), 8);
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
        }
    }

    #[test]
    fn test_bresenham_reverse_direction() {
        let points = bresenham((5, 5), (0, 0));
        assert_eq!(points.len(), 6);
        assert!(points.contains(&(2, 2)));
    }

    #[test]
    fn test_far_endpoint_is_clipped_to_canvas() {
        let cells = line_cells(Pos::new(0, 0), Pos::new(0, usize::MAX), &brush(), &Grid::new());
        assert_eq!(cells.len(), COLS);
        let cells = line_cells(Pos::new(usize::MAX, usize::MAX), Pos::new(0, 0), &brush(), &Grid::new());
        assert!(cells.contains_key(&Pos::new(0, 0)));
        assert!(cells.len() <= COLS);
    }

    #[test]
    fn test_line_entirely_off_canvas_is_empty() {
        let cells = line_cells(Pos::new(0, 100), Pos::new(10, 300), &brush(), &Grid::new());
        assert!(cells.is_empty());
    }

    #[test]
    fn test_clip_keeps_visible_segment() {
        assert_eq!(clip((0, 75), (0, 90), 24, 79), Some(((0, 75), (0, 79))));
        assert_eq!(clip((2, 2), (5, 9), 24, 79), Some(((2, 2), (5, 9))));
        assert_eq!(clip((30, 0), (40, 10), 24, 79), None);
    }

    #[test]
    fn test_bresenham_extreme_coordinates_do_not_overflow() {
        let points = bresenham((0, i32::MAX - 2), (0, i32::MAX));
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_pixel_vertical_line_fills_both_halves() {
        let brush = brush().with_mode(BrushMode::Pixel);
        // Half rows 2..=5 span cells 1 and 2.
        let cells = line_cells(Pos::new(2, 0), Pos::new(5, 0), &brush, &Grid::new());
        assert_eq!(cells.len(), 2);
        for cell in cells.values() {
            assert_eq!(cell.halves(), (Color::Rgb(Rgb::WHITE), Color::Rgb(Rgb::WHITE)));
        }
    }

    #[test]
    fn test_pixel_line_keeps_untouched_half() {
        let mut grid = Grid::new();
        grid.set(0, 0, Cell::from_halves(Color::Unpainted, Color::Rgb(Rgb::BLUE)));
        let brush = brush().with_mode(BrushMode::Pixel);
        let cells = line_cells(Pos::new(0, 0), Pos::new(0, 0), &brush, &grid);
        assert_eq!(
            cells[&Pos::new(0, 0)].halves(),
            (Color::Rgb(Rgb::WHITE), Color::Rgb(Rgb::BLUE))
        );
    }
}
