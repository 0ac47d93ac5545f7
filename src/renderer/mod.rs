//! Diff-based terminal renderer.
//!
//! This module provides [`TerminalBuffer`], which keeps a snapshot of the
//! last grid it rendered and, on every [`flush`](TerminalBuffer::flush),
//! writes only the cells whose on-screen appearance changed.
//!
//! # Architecture
//!
//! - **Snapshot**: the last grid flushed to the sink (used for diff detection)
//! - **Sink**: any [`TerminalSink`]; `None` while detached
//! - **Full-redraw flag**: set by attach and invalidate, cleared by the next
//!   flush
//!
//! Each flush batches every change into a single `write` call: a cursor
//! position, foreground/background SGR only when they differ from the last
//! ones emitted, then the character.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::renderer::TerminalBuffer;
//! use ansicanvas::{Cell, Grid, Rgb};
//!
//! let mut term = TerminalBuffer::new();
//! term.attach(Vec::<String>::new());
//!
//! let mut grid = Grid::new();
//! term.flush(&grid, None); // full repaint
//! grid.set(2, 3, Cell::new('x', Rgb::RED, Rgb::BLACK));
//! term.flush(&grid, None); // one cell
//! term.flush(&grid, None); // nothing
//!
//! let writes = term.detach().unwrap();
//! assert_eq!(writes.len(), 2);
//! assert!(writes[1].starts_with("\x1b[3;4H"));
//! ```

mod diff;
mod sink;

pub use diff::{DirtyRegion, GridDiff, rendered};
pub use sink::{IoSink, TerminalSink};

use crate::ansi::AnsiWriter;
use crate::cell::Cell;
use crate::color::ColorTransform;
use crate::grid::Grid;

/// Rendering statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Flushes that issued a write.
    pub writes: u64,
    /// Cells written by the most recent write.
    pub last_write_cells: usize,
    /// Total bytes handed to the sink.
    pub total_bytes: usize,
}

/// Last-rendered grid plus the sink it was rendered to.
#[derive(Debug)]
pub struct TerminalBuffer<S: TerminalSink> {
    snapshot: Grid,
    sink: Option<S>,
    force_redraw: bool,
    writer: AnsiWriter,
    stats: RenderStats,
}

impl<S: TerminalSink> TerminalBuffer<S> {
    /// A detached buffer. The first flush after [`attach`](Self::attach)
    /// repaints everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: Grid::new(),
            sink: None,
            force_redraw: true,
            writer: AnsiWriter::new(),
            stats: RenderStats::default(),
        }
    }

    /// Attach a sink, returning the previous one. The next flush is a full
    /// repaint.
    pub fn attach(&mut self, sink: S) -> Option<S> {
        self.force_redraw = true;
        self.sink.replace(sink)
    }

    /// Detach the sink. Flushes write nothing until the next attach.
    pub fn detach(&mut self) -> Option<S> {
        self.sink.take()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    #[must_use]
    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Force next flush to repaint every cell.
    pub fn invalidate(&mut self) {
        self.force_redraw = true;
    }

    /// The grid as last rendered.
    #[must_use]
    pub fn snapshot(&self) -> &Grid {
        &self.snapshot
    }

    #[must_use]
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Write every cell that changed since the last flush in one batch.
    ///
    /// Returns the number of cells written.
    pub fn flush(&mut self, grid: &Grid, transform: Option<&dyn ColorTransform>) -> usize {
        if self.sink.is_none() {
            return 0;
        }
        let diff = if self.force_redraw {
            GridDiff::full()
        } else {
            GridDiff::compute(&self.snapshot, grid, transform)
        };
        self.force_redraw = false;
        self.snapshot.clone_from(grid);
        if diff.is_empty() {
            return 0;
        }

        self.writer.reset_state();
        for region in &diff.dirty_regions {
            for pos in region.positions() {
                let cell = rendered(&grid.cell(pos.row, pos.col), transform);
                self.writer
                    .write_cell_at(pos.row as u32, pos.col as u32, &cell);
            }
        }
        self.writer.reset();
        self.emit(diff.change_count);
        diff.change_count
    }

    /// Write one cell immediately and record it in the snapshot, so a later
    /// flush of a grid holding the same value skips it.
    ///
    /// Returns whether anything was written.
    pub fn write_cell(
        &mut self,
        row: usize,
        col: usize,
        cell: Cell,
        transform: Option<&dyn ColorTransform>,
    ) -> bool {
        if self.sink.is_none() {
            return false;
        }
        let Some(slot) = self.snapshot.get_mut(row, col) else {
            return false;
        };
        let new = rendered(&cell, transform);
        if !self.force_redraw && rendered(slot, transform) == new {
            return false;
        }
        *slot = cell;

        self.writer.reset_state();
        self.writer.write_cell_at(row as u32, col as u32, &new);
        self.writer.reset();
        self.emit(1);
        true
    }

    fn emit(&mut self, cells: usize) {
        let out = self.writer.take();
        if let Some(sink) = self.sink.as_mut() {
            sink.write(&out);
        }
        self.stats.writes = self.stats.writes.saturating_add(1);
        self.stats.last_write_cells = cells;
        self.stats.total_bytes = self.stats.total_bytes.saturating_add(out.len());
    }
}

impl<S: TerminalSink> Default for TerminalBuffer<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Quantize, Rgb};
    use crate::grid::{COLS, ROWS};

    fn attached() -> TerminalBuffer<Vec<String>> {
        let mut term = TerminalBuffer::new();
        term.attach(Vec::new());
        term
    }

    fn writes(term: &TerminalBuffer<Vec<String>>) -> usize {
        term.sink().map_or(0, Vec::len)
    }

    #[test]
    fn test_first_flush_after_attach_is_full() {
        let mut term = attached();
        assert_eq!(term.flush(&Grid::new(), None), ROWS * COLS);
        assert_eq!(writes(&term), 1);
    }

    #[test]
    fn test_second_identical_flush_writes_nothing() {
        let mut term = attached();
        let grid = Grid::new();
        term.flush(&grid, None);
        assert_eq!(term.flush(&grid, None), 0);
        assert_eq!(writes(&term), 1);
    }

    #[test]
    fn test_single_change_patch() {
        let mut term = attached();
        let mut grid = Grid::new();
        term.flush(&grid, None);
        grid.set(4, 7, Cell::new('q', Rgb::GREEN, Rgb::BLUE));
        assert_eq!(term.flush(&grid, None), 1);
        let last = term.sink().unwrap().last().unwrap().clone();
        insta::assert_snapshot!(
            last.replace('\x1b', "ESC"),
            @"ESC[5;8HESC[38;2;0;255;0mESC[48;2;0;0;255mqESC[0m"
        );
    }

    #[test]
    fn test_colors_emitted_once_per_run() {
        let mut term = attached();
        let mut grid = Grid::new();
        term.flush(&grid, None);
        let cell = Cell::new('=', Rgb::RED, Rgb::BLACK);
        grid.set(0, 0, cell);
        grid.set(0, 1, cell);
        grid.set(0, 2, cell);
        term.flush(&grid, None);
        let last = term.sink().unwrap().last().unwrap();
        assert_eq!(last.matches("38;2;").count(), 1);
        assert_eq!(last.matches('H').count(), 1, "adjacent cells need one cursor move");
    }

    #[test]
    fn test_detached_flush_is_silent() {
        let mut term: TerminalBuffer<Vec<String>> = TerminalBuffer::new();
        assert_eq!(term.flush(&Grid::new(), None), 0);
        term.attach(Vec::new());
        let sink = term.detach().unwrap();
        assert!(sink.is_empty());
        assert!(!term.write_cell(0, 0, Cell::BLANK, None));
    }

    #[test]
    fn test_reattach_forces_full_repaint() {
        let mut term = attached();
        let grid = Grid::new();
        term.flush(&grid, None);
        let old = term.attach(Vec::new()).unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(term.flush(&grid, None), ROWS * COLS);
    }

    #[test]
    fn test_write_cell_updates_snapshot() {
        let mut term = attached();
        let mut grid = Grid::new();
        term.flush(&grid, None);
        let cell = Cell::new('k', Rgb::WHITE, Rgb::RED);
        assert!(term.write_cell(1, 1, cell, None));
        assert!(!term.write_cell(1, 1, cell, None));
        assert!(!term.write_cell(99, 1, cell, None));
        grid.set(1, 1, cell);
        assert_eq!(term.flush(&grid, None), 0);
        assert_eq!(writes(&term), 2);
    }

    #[test]
    fn test_invalidate_after_transform_change() {
        let mut term = attached();
        let mut grid = Grid::new();
        grid.set(0, 0, Cell::new('x', Rgb::new(200, 10, 10), Rgb::BLACK));
        term.flush(&grid, None);
        let quantize = Quantize::Xterm256;
        term.invalidate();
        assert_eq!(term.flush(&grid, Some(&quantize)), ROWS * COLS);
        assert_eq!(term.flush(&grid, Some(&quantize)), 0);
    }

    #[test]
    fn test_stats_track_writes() {
        let mut term = attached();
        term.flush(&Grid::new(), None);
        assert_eq!(term.stats().writes, 1);
        assert_eq!(term.stats().last_write_cells, ROWS * COLS);
        assert!(term.stats().total_bytes > ROWS * COLS);
    }
}
