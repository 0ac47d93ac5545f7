//! ANSI text export.
//!
//! Renders a composite grid as plain truecolor ANSI art: rows top to bottom,
//! SGR sequences only where the color changes, `\r\n` between rows and a
//! reset at the end. The output replays correctly on any truecolor terminal
//! starting from the home position.

use crate::ansi::AnsiWriter;
use crate::color::ColorTransform;
use crate::grid::Grid;
use crate::renderer::rendered;
use std::io::{self, Write};

/// Render `grid` as ANSI text.
#[must_use]
pub fn to_ansi(grid: &Grid) -> String {
    to_ansi_with(grid, None)
}

/// Render `grid` as ANSI text after applying a color transform.
#[must_use]
pub fn to_ansi_with(grid: &Grid, transform: Option<&dyn ColorTransform>) -> String {
    let mut writer = AnsiWriter::new();
    for (row, cells) in grid.rows().enumerate() {
        if row > 0 {
            writer.newline();
        }
        for cell in cells {
            writer.write_cell(&rendered(cell, transform));
        }
    }
    writer.reset();
    writer.take()
}

/// Write the ANSI rendering of `grid` to `out`.
pub fn write_ansi<W: Write>(out: &mut W, grid: &Grid) -> io::Result<()> {
    out.write_all(to_ansi(grid).as_bytes())
}
