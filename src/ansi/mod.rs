//! ANSI escape sequence generation.
//!
//! Only the subset a cell canvas needs: absolute cursor positioning and
//! truecolor SGR. Sequences are written as raw bytes into any [`Write`]
//! target; the `String`-returning helpers wrap those writers.

pub mod output;
pub mod sequences;

pub use output::AnsiWriter;
pub use sequences::*;

use crate::color::Rgb;
use std::io::{self, Write};

/// Generate SGR (Select Graphic Rendition) sequence for foreground color.
#[must_use]
pub fn fg_color(color: Rgb) -> String {
    let mut buf = Vec::new();
    let _ = write_fg_color(&mut buf, color);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Generate SGR sequence for background color.
#[must_use]
pub fn bg_color(color: Rgb) -> String {
    let mut buf = Vec::new();
    let _ = write_bg_color(&mut buf, color);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Generate cursor position sequence (1-indexed).
#[must_use]
pub fn cursor_position(row: u32, col: u32) -> String {
    let mut buf = Vec::new();
    let _ = write_cursor_position(&mut buf, row, col);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write a u8 as decimal digits to a writer without formatting overhead.
#[inline]
fn write_u8_decimal(w: &mut impl Write, n: u8) -> io::Result<()> {
    if n >= 100 {
        w.write_all(&[b'0' + n / 100, b'0' + (n / 10) % 10, b'0' + n % 10])
    } else if n >= 10 {
        w.write_all(&[b'0' + n / 10, b'0' + n % 10])
    } else {
        w.write_all(&[b'0' + n])
    }
}

/// Write a u32 as decimal digits to a writer without formatting overhead.
#[inline]
fn write_u32_decimal(w: &mut impl Write, n: u32) -> io::Result<()> {
    if n < 10 {
        return w.write_all(&[b'0' + n as u8]);
    }
    if n < 100 {
        return w.write_all(&[b'0' + (n / 10) as u8, b'0' + (n % 10) as u8]);
    }

    let mut buf = [0u8; 10]; // max u32 is 4294967295 (10 digits)
    let mut i = buf.len();
    let mut val = n;
    while val > 0 {
        i -= 1;
        buf[i] = b'0' + (val % 10) as u8;
        val /= 10;
    }
    w.write_all(&buf[i..])
}

fn write_rgb_sgr(w: &mut impl Write, prefix: &[u8], color: Rgb) -> io::Result<()> {
    w.write_all(prefix)?;
    write_u8_decimal(w, color.r)?;
    w.write_all(b";")?;
    write_u8_decimal(w, color.g)?;
    w.write_all(b";")?;
    write_u8_decimal(w, color.b)?;
    w.write_all(b"m")
}

/// Write truecolor foreground SGR (`ESC[38;2;r;g;bm`).
pub fn write_fg_color(w: &mut impl Write, color: Rgb) -> io::Result<()> {
    write_rgb_sgr(w, b"\x1b[38;2;", color)
}

/// Write truecolor background SGR (`ESC[48;2;r;g;bm`).
pub fn write_bg_color(w: &mut impl Write, color: Rgb) -> io::Result<()> {
    write_rgb_sgr(w, b"\x1b[48;2;", color)
}

/// Write cursor position sequence; `row`/`col` are 0-indexed.
pub fn write_cursor_position(w: &mut impl Write, row: u32, col: u32) -> io::Result<()> {
    w.write_all(b"\x1b[")?;
    write_u32_decimal(w, row.saturating_add(1))?;
    w.write_all(b";")?;
    write_u32_decimal(w, col.saturating_add(1))?;
    w.write_all(b"H")
}
