//! Image import.
//!
//! Decoding a file is the host's job. This module takes the decoded RGBA
//! buffer, scales it to fit the canvas' 80x50 half-pixel lattice without
//! upscaling, and packs it into a half-block [`Grid`]: even pixel rows become
//! cell foregrounds, odd rows backgrounds. Pixels with alpha below 128 stay
//! unpainted.

use crate::cell::{Cell, Half};
use crate::color::{Color, Rgb};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::grid::{COLS, Grid, PIXEL_ROWS};

/// Alpha at or above this value counts as painted.
pub const ALPHA_THRESHOLD: u8 = 128;

/// A decoded RGBA image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    file: String,
    rgba: Vec<u8>,
    width: usize,
    height: usize,
}

impl DecodedImage {
    /// Wrap a decoded buffer. `rgba` must hold exactly `width * height * 4`
    /// bytes and both dimensions must be non-zero.
    pub fn new(file: impl Into<String>, rgba: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        let file = file.into();
        let reject = |reason: String| {
            emit_log(LogLevel::Warn, &format!("rejected image {file}: {reason}"));
            Error::ImageDecode {
                file: file.clone(),
                reason,
            }
        };
        if width == 0 || height == 0 {
            return Err(reject(format!("empty image ({width}x{height})")));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| reject(format!("image too large ({width}x{height})")))?;
        if rgba.len() != expected {
            return Err(reject(format!(
                "expected {expected} bytes of RGBA data, found {}",
                rgba.len()
            )));
        }
        Ok(Self {
            file,
            rgba,
            width,
            height,
        })
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA of one pixel. Panics if `(x, y)` is outside the image.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    /// Nearest-neighbour resample into the canvas' pixel bounds. Images that
    /// already fit are returned unchanged.
    #[must_use]
    pub fn scaled_to_fit(&self) -> Self {
        let (width, height) = fit_size(self.width, self.height);
        if (width, height) == (self.width, self.height) {
            return self.clone();
        }
        let mut rgba = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            let sy = y * self.height / height;
            for x in 0..width {
                let sx = x * self.width / width;
                rgba.extend_from_slice(&self.pixel(sx, sy));
            }
        }
        Self {
            file: self.file.clone(),
            rgba,
            width,
            height,
        }
    }

    /// Scale to fit and convert to a half-block grid.
    #[must_use]
    pub fn to_grid(&self) -> Grid {
        let fitted = self.scaled_to_fit();
        grid_from_rgba(&fitted.rgba, fitted.width, fitted.height)
    }
}

/// Largest size with the same aspect ratio that fits in `COLS x PIXEL_ROWS`.
/// Never upscales; dimensions stay at least 1.
#[must_use]
pub fn fit_size(width: usize, height: usize) -> (usize, usize) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width <= COLS && height <= PIXEL_ROWS {
        return (width, height);
    }
    // Compare COLS/width against PIXEL_ROWS/height without floats.
    if COLS * height <= PIXEL_ROWS * width {
        let h = (height * COLS / width).max(1);
        (COLS, h)
    } else {
        let w = (width * PIXEL_ROWS / height).max(1);
        (w, PIXEL_ROWS)
    }
}

/// Pack an RGBA buffer into half-block cells anchored at the top-left.
///
/// Pixels outside the canvas and bytes past the end of `rgba` are ignored.
#[must_use]
pub fn grid_from_rgba(rgba: &[u8], width: usize, height: usize) -> Grid {
    let mut grid = Grid::new();
    for y in 0..height.min(PIXEL_ROWS) {
        for x in 0..width.min(COLS) {
            let i = (y * width + x) * 4;
            let Some(&[r, g, b, a]) = rgba.get(i..i + 4).and_then(|p| <&[u8; 4]>::try_from(p).ok())
            else {
                continue;
            };
            let color = if a < ALPHA_THRESHOLD {
                Color::Unpainted
            } else {
                Color::Rgb(Rgb::new(r, g, b))
            };
            let row = y / 2;
            let cell = grid.cell(row, x).with_half(Half::of_pixel_row(y), color);
            grid.set(row, x, cell);
        }
    }
    grid
}

/// An opaque single-color RGBA buffer.
#[must_use]
pub fn solid_rgba(width: usize, height: usize, color: Rgb) -> Vec<u8> {
    [color.r, color.g, color.b, 255].repeat(width * height)
}

/// The half-block cell for a top and bottom pixel; `None` is unpainted.
#[must_use]
pub fn half_block(top: Option<Rgb>, bottom: Option<Rgb>) -> Cell {
    Cell::from_halves(
        top.map_or(Color::Unpainted, Color::Rgb),
        bottom.map_or(Color::Unpainted, Color::Rgb),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::HALF_BLOCK;

    #[test]
    fn test_new_validates_length() {
        let err = DecodedImage::new("cat.png", vec![0; 7], 1, 2).unwrap_err();
        match err {
            Error::ImageDecode { file, reason } => {
                assert_eq!(file, "cat.png");
                assert!(reason.contains("expected 8 bytes"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(DecodedImage::new("empty.png", Vec::new(), 0, 0).is_err());
        assert!(DecodedImage::new("ok.png", vec![0; 8], 1, 2).is_ok());
    }

    #[test]
    fn test_fit_size() {
        assert_eq!(fit_size(10, 10), (10, 10));
        assert_eq!(fit_size(80, 50), (80, 50));
        assert_eq!(fit_size(160, 50), (80, 25));
        assert_eq!(fit_size(80, 100), (40, 50));
        assert_eq!(fit_size(1000, 1), (80, 1));
        assert_eq!(fit_size(0, 5), (0, 0));
    }

    #[test]
    fn test_grid_from_rgba_pairs_rows() {
        let mut rgba = solid_rgba(1, 2, Rgb::RED);
        rgba[4..8].copy_from_slice(&[0, 0, 255, 255]);
        let grid = grid_from_rgba(&rgba, 1, 2);
        let cell = grid.cell(0, 0);
        assert_eq!(cell.ch, HALF_BLOCK);
        assert_eq!(cell, half_block(Some(Rgb::RED), Some(Rgb::BLUE)));
        assert!(grid.cell(0, 1).is_blank());
    }

    #[test]
    fn test_transparent_pixels_stay_unpainted() {
        let rgba = vec![
            255, 0, 0, 127, // top: below threshold
            0, 255, 0, 128, // bottom: painted
        ];
        let grid = grid_from_rgba(&rgba, 1, 2);
        assert_eq!(grid.cell(0, 0), half_block(None, Some(Rgb::GREEN)));

        let clear = vec![0; 8];
        assert!(grid_from_rgba(&clear, 1, 2).is_blank());
    }

    #[test]
    fn test_odd_height_leaves_bottom_unpainted() {
        let grid = grid_from_rgba(&solid_rgba(2, 3, Rgb::WHITE), 2, 3);
        assert_eq!(grid.cell(1, 0), half_block(Some(Rgb::WHITE), None));
    }

    #[test]
    fn test_scaled_import_fits_canvas() {
        let image = DecodedImage::new("wide.png", solid_rgba(160, 100, Rgb::GREEN), 160, 100).unwrap();
        let scaled = image.scaled_to_fit();
        assert_eq!((scaled.width(), scaled.height()), (80, 50));
        let grid = image.to_grid();
        assert!(grid.cells().iter().all(|c| *c == half_block(Some(Rgb::GREEN), Some(Rgb::GREEN))));
    }
}
