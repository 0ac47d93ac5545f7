//! Rectangles and ovals.

use super::line::lattice;
use super::{Brush, CellMap, lattice_rows, stamp};
use crate::grid::{COLS, Grid, Pos};
use std::ops::RangeInclusive;

/// Outline family drawn inside the start/end bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    #[default]
    Rect,
    Oval,
}

/// Cells written by a rectangle or oval spanning `start` and `end`.
///
/// Outlines touch but never leave the bounding box. Filled shapes cover
/// every lattice point inside the outline.
#[must_use]
pub fn shape_cells(
    start: Pos,
    end: Pos,
    brush: &Brush,
    grid: &Grid,
    shape: Shape,
    filled: bool,
) -> CellMap {
    let bounds = BoundingBox::new(lattice(start), lattice(end), lattice_rows(brush));
    let points = match shape {
        Shape::Rect => rect_points(&bounds, filled),
        Shape::Oval => oval_points(&bounds, filled),
    };
    let mut cells = CellMap::new();
    for (row, col) in points {
        stamp(&mut cells, grid, brush, row, col);
    }
    cells
}

/// The start/end box on the brush's lattice, kept as drawn even when it
/// reaches past the canvas. Points are clipped to `max_row`/`max_col` as
/// they are produced, so a shape dragged off the edge keeps its form.
#[derive(Clone, Copy, Debug)]
pub(super) struct BoundingBox {
    pub r0: i32,
    pub c0: i32,
    pub r1: i32,
    pub c1: i32,
    max_row: i32,
    max_col: i32,
}

impl BoundingBox {
    pub(super) fn new(a: (i32, i32), b: (i32, i32), rows: usize) -> Self {
        Self {
            r0: a.0.min(b.0),
            c0: a.1.min(b.1),
            r1: a.0.max(b.0),
            c1: a.1.max(b.1),
            max_row: i32::try_from(rows).unwrap_or(i32::MAX) - 1,
            max_col: COLS as i32 - 1,
        }
    }

    fn visible_rows(&self) -> RangeInclusive<i32> {
        self.r0.max(0)..=self.r1.min(self.max_row)
    }

    fn visible_cols(&self, left: i32, right: i32) -> RangeInclusive<i32> {
        left.max(self.c0).max(0)..=right.min(self.c1).min(self.max_col)
    }
}

pub(super) fn rect_points(b: &BoundingBox, filled: bool) -> Vec<(i32, i32)> {
    let mut points = Vec::new();
    for row in b.visible_rows() {
        for col in b.visible_cols(b.c0, b.c1) {
            let edge = row == b.r0 || row == b.r1 || col == b.c0 || col == b.c1;
            if filled || edge {
                points.push((row, col));
            }
        }
    }
    points
}

fn oval_points(b: &BoundingBox, filled: bool) -> Vec<(i32, i32)> {
    let oval = Oval::new(b);
    let mut points = Vec::new();
    for row in b.visible_rows() {
        let Some((left, right)) = oval.span(row) else {
            continue;
        };
        for col in b.visible_cols(left, right) {
            let edge = [(-1, 0), (1, 0), (0, -1), (0, 1)]
                .iter()
                .any(|(dr, dc)| !oval.contains(row + dr, col + dc));
            if filled || edge {
                points.push((row, col));
            }
        }
    }
    points
}

/// The ellipse inscribed in a box, as one horizontal span per row.
struct Oval<'a> {
    bounds: &'a BoundingBox,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
}

impl<'a> Oval<'a> {
    fn new(bounds: &'a BoundingBox) -> Self {
        let rx = f64::from(bounds.c1 - bounds.c0) / 2.0;
        let ry = f64::from(bounds.r1 - bounds.r0) / 2.0;
        Self {
            bounds,
            cx: f64::from(bounds.c0) + rx,
            cy: f64::from(bounds.r0) + ry,
            rx,
            ry,
        }
    }

    fn span(&self, row: i32) -> Option<(i32, i32)> {
        let b = self.bounds;
        if row < b.r0 || row > b.r1 {
            return None;
        }
        let t = if self.ry > 0.0 {
            (f64::from(row) - self.cy) / self.ry
        } else {
            0.0
        };
        let half = self.rx * (1.0 - t * t).max(0.0).sqrt();
        let mut left = (self.cx - half + 0.5).floor() as i32;
        let mut right = (self.cx + half - 0.5).ceil() as i32;
        if right < left {
            std::mem::swap(&mut left, &mut right);
        }
        Some((left.max(b.c0), right.min(b.c1)))
    }

    fn contains(&self, row: i32, col: i32) -> bool {
        self.span(row)
            .is_some_and(|(left, right)| (left..=right).contains(&col))
    }
}
