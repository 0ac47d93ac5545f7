//! Buffered ANSI output writer with state tracking.

use crate::ansi;
use crate::cell::{Cell, DEFAULT_BG, DEFAULT_FG};
use crate::color::Rgb;
use unicode_width::UnicodeWidthChar;

/// Buffered writer that tracks ANSI state to minimize escape sequences.
///
/// Colors are only emitted when they differ from the last ones written, and
/// cursor moves are skipped when the cursor is already in place.
#[derive(Clone, Debug, Default)]
pub struct AnsiWriter {
    buffer: Vec<u8>,

    // Current state for delta encoding
    current_fg: Option<Rgb>,
    current_bg: Option<Rgb>,

    // Cursor position, if known
    cursor: Option<(u32, u32)>,
}

impl AnsiWriter {
    /// Create an empty writer with unknown terminal state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(8192),
            ..Self::default()
        }
    }

    /// Forget all tracked state; the next cell emits every sequence again.
    pub fn reset_state(&mut self) {
        self.current_fg = None;
        self.current_bg = None;
        self.cursor = None;
    }

    /// Write a raw string to the buffer.
    ///
    /// Raw text may move the cursor anywhere, so the tracked position is
    /// dropped.
    pub fn write_str(&mut self, s: &str) {
        self.buffer.extend_from_slice(s.as_bytes());
        self.cursor = None;
    }

    /// Write a line break and continue tracking from the next row's start.
    pub fn newline(&mut self) {
        self.buffer.extend_from_slice(b"\r\n");
        self.cursor = self.cursor.map(|(row, _)| (row + 1, 0));
    }

    /// Move cursor to a 0-indexed position unless it is already there.
    pub fn move_cursor(&mut self, row: u32, col: u32) {
        if self.cursor == Some((row, col)) {
            return;
        }
        let _ = ansi::write_cursor_position(&mut self.buffer, row, col);
        self.cursor = Some((row, col));
    }

    /// Set foreground color if different from current.
    pub fn set_fg(&mut self, color: Rgb) {
        if self.current_fg != Some(color) {
            let _ = ansi::write_fg_color(&mut self.buffer, color);
            self.current_fg = Some(color);
        }
    }

    /// Set background color if different from current.
    pub fn set_bg(&mut self, color: Rgb) {
        if self.current_bg != Some(color) {
            let _ = ansi::write_bg_color(&mut self.buffer, color);
            self.current_bg = Some(color);
        }
    }

    /// Write a cell at the current cursor position.
    ///
    /// Marker colors fall back to the canvas defaults.
    pub fn write_cell(&mut self, cell: &Cell) {
        self.set_fg(cell.fg.or(DEFAULT_FG));
        self.set_bg(cell.bg.or(DEFAULT_BG));
        let mut utf8 = [0u8; 4];
        self.buffer
            .extend_from_slice(cell.ch.encode_utf8(&mut utf8).as_bytes());

        let width = cell.ch.width().unwrap_or(0) as u32;
        self.cursor = match self.cursor {
            Some((row, col)) if width > 0 => Some((row, col + width)),
            _ => None,
        };
    }

    /// Move to a position and write a cell there.
    pub fn write_cell_at(&mut self, row: u32, col: u32, cell: &Cell) {
        self.move_cursor(row, col);
        self.write_cell(cell);
    }

    /// Reset all ANSI attributes.
    pub fn reset(&mut self) {
        self.buffer.extend_from_slice(ansi::RESET.as_bytes());
        self.current_fg = None;
        self.current_bg = None;
    }

    /// Get a reference to the buffer.
    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Take the buffered output, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        out
    }
}
