//! Property-based tests for the drawing algorithms.

use ansicanvas::cell::Cell;
use ansicanvas::color::Rgb;
use ansicanvas::draw::{Brush, BrushMode, Shape, flood_fill_cells, line_cells, shape_cells};
use ansicanvas::grid::{COLS, Grid, PIXEL_ROWS, Pos, ROWS};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn pos_strategy() -> impl Strategy<Value = Pos> {
    (0..ROWS, 0..COLS).prop_map(|(row, col)| Pos::new(row, col))
}

fn pixel_pos_strategy() -> impl Strategy<Value = Pos> {
    (0..PIXEL_ROWS, 0..COLS).prop_map(|(row, col)| Pos::new(row, col))
}

/// A grid scribbled with a few colors so fills stop at borders.
fn grid_strategy() -> impl Strategy<Value = Grid> {
    prop::collection::vec((0..ROWS, 0..COLS, 0u8..3), 0..200).prop_map(|marks| {
        let mut grid = Grid::new();
        for (row, col, shade) in marks {
            let color = Rgb::new(shade * 100, 0, 0);
            grid.set(row, col, Cell::new('+', color, color));
        }
        grid
    })
}

/// Modes whose fill color does not depend on what it covers. A blend fill
/// mixes toward the brush again on every pass.
fn fixed_mode_strategy() -> impl Strategy<Value = BrushMode> {
    prop_oneof![
        Just(BrushMode::Brush),
        Just(BrushMode::Pixel),
        Just(BrushMode::Eraser),
    ]
}

fn apply(grid: &mut Grid, cells: &ansicanvas::CellMap) {
    for (pos, cell) in cells {
        grid.set(pos.row, pos.col, *cell);
    }
}

// ============================================================================
// Line Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A cell-lattice line visits one cell per step of its longer axis and
    /// includes both endpoints.
    #[test]
    fn line_covers_endpoints(a in pos_strategy(), b in pos_strategy()) {
        let brush = Brush::new('*', Rgb::WHITE, Rgb::BLACK);
        let cells = line_cells(a, b, &brush, &Grid::new());
        let steps = a.row.abs_diff(b.row).max(a.col.abs_diff(b.col));
        prop_assert_eq!(cells.len(), steps + 1);
        prop_assert!(cells.contains_key(&a));
        prop_assert!(cells.contains_key(&b));
    }

    /// Direction does not change how many cells a line touches.
    #[test]
    fn line_length_ignores_direction(a in pos_strategy(), b in pos_strategy()) {
        let brush = Brush::new('*', Rgb::WHITE, Rgb::BLACK);
        let grid = Grid::new();
        let forward: Vec<Pos> = line_cells(a, b, &brush, &grid).into_keys().collect();
        let backward: Vec<Pos> = line_cells(b, a, &brush, &grid).into_keys().collect();
        prop_assert_eq!(forward.len(), backward.len());
    }

    /// Pixel lines land on the cells holding their half rows.
    #[test]
    fn pixel_line_stays_on_canvas(a in pixel_pos_strategy(), b in pixel_pos_strategy()) {
        let brush = Brush::new(' ', Rgb::GREEN, Rgb::BLACK).with_mode(BrushMode::Pixel);
        let cells = line_cells(a, b, &brush, &Grid::new());
        prop_assert!(cells.contains_key(&Pos::new(a.row / 2, a.col)));
        prop_assert!(cells.contains_key(&Pos::new(b.row / 2, b.col)));
        prop_assert!(cells.values().all(Cell::is_half_block));
    }
}

// ============================================================================
// Shape and Fill Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every outline is contained in its filled counterpart.
    #[test]
    fn outline_within_fill(a in pos_strategy(), b in pos_strategy(), oval in any::<bool>()) {
        let brush = Brush::new('#', Rgb::WHITE, Rgb::BLACK);
        let grid = Grid::new();
        let shape = if oval { Shape::Oval } else { Shape::Rect };
        let outline = shape_cells(a, b, &brush, &grid, shape, false);
        let filled = shape_cells(a, b, &brush, &grid, shape, true);
        prop_assert!(!outline.is_empty());
        prop_assert!(outline.keys().all(|pos| filled.contains_key(pos)));
    }

    /// A second fill from the same point changes nothing.
    #[test]
    fn fill_is_idempotent(
        grid in grid_strategy(),
        start in pos_strategy(),
        mode in fixed_mode_strategy(),
    ) {
        let brush = Brush::new('#', Rgb::new(0, 0, 200), Rgb::BLACK).with_mode(mode);
        let start = if mode.is_pixel() { Pos::new(start.row * 2, start.col) } else { start };
        let mut grid = grid;
        let first = flood_fill_cells(start, &brush, &grid);
        apply(&mut grid, &first);
        let second = flood_fill_cells(start, &brush, &grid);
        prop_assert!(second.is_empty(), "second fill wrote {} cells", second.len());
    }

    /// Drawing reads the grid but never writes it.
    #[test]
    fn drawing_is_pure(grid in grid_strategy(), a in pos_strategy(), b in pos_strategy()) {
        let before = grid.clone();
        let brush = Brush::new('#', Rgb::WHITE, Rgb::BLACK).with_mode(BrushMode::Blend);
        let _ = line_cells(a, b, &brush, &grid);
        let _ = shape_cells(a, b, &brush, &grid, Shape::Oval, true);
        let _ = flood_fill_cells(a, &brush, &grid);
        prop_assert_eq!(grid, before);
    }
}
