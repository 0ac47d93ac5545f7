//! Editor configuration.
//!
//! [`EditorOptions`] collects the tunables of an [`Editor`](crate::editor::Editor).
//! [`ColorMode`] decides how the renderer maps truecolor cells onto what the
//! terminal can actually show.

use crate::color::{ColorTransform, Quantize};
use crate::draw::DEFAULT_BLEND_RATIO;
use crate::history::DEFAULT_CAPACITY;
use crate::layer::{DEFAULT_FRAME_DURATION_MS, MAX_FRAME_DURATION_MS, MIN_FRAME_DURATION_MS};
use std::env;

/// Color output mode for rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// True color (24-bit RGB).
    #[default]
    TrueColor,
    /// 256-color palette.
    Color256,
    /// 16-color (basic ANSI).
    Color16,
}

impl ColorMode {
    /// Detect the mode from `COLORTERM` and `TERM`.
    #[must_use]
    pub fn detect() -> Self {
        let term = env::var("TERM").unwrap_or_default();
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        Self::from_env_values(&term, &colorterm)
    }

    /// Classify explicit `TERM`/`COLORTERM` values.
    #[must_use]
    pub fn from_env_values(term: &str, colorterm: &str) -> Self {
        if colorterm.eq_ignore_ascii_case("truecolor") || colorterm.eq_ignore_ascii_case("24bit") {
            return Self::TrueColor;
        }
        if term.contains("24bit") || term.contains("truecolor") || term.contains("direct") {
            return Self::TrueColor;
        }

        let truecolor_terms = ["alacritty", "kitty", "wezterm", "ghostty"];
        if truecolor_terms.iter().any(|t| term.contains(t)) {
            return Self::TrueColor;
        }

        if term.contains("256") {
            return Self::Color256;
        }

        Self::Color16
    }

    /// The palette quantizer for this mode; `None` for truecolor.
    #[must_use]
    pub fn quantizer(self) -> Option<Quantize> {
        match self {
            Self::TrueColor => None,
            Self::Color256 => Some(Quantize::Xterm256),
            Self::Color16 => Some(Quantize::Ansi16),
        }
    }
}

/// Editor tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorOptions {
    /// Maximum number of undo steps kept.
    pub history_capacity: usize,
    /// Blend-pixel interpolation ratio in `[0, 1]`.
    pub blend_ratio: f32,
    /// Playback duration of new frames.
    pub frame_duration_ms: u32,
    pub color_mode: ColorMode,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            blend_ratio: DEFAULT_BLEND_RATIO,
            frame_duration_ms: DEFAULT_FRAME_DURATION_MS,
            color_mode: ColorMode::TrueColor,
        }
    }
}

impl EditorOptions {
    /// Defaults with the color mode detected from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            color_mode: ColorMode::detect(),
            ..Self::default()
        }
        .normalized()
    }

    /// Clamp every field into its valid range.
    #[must_use]
    pub fn normalized(self) -> Self {
        let blend_ratio = if self.blend_ratio.is_nan() {
            DEFAULT_BLEND_RATIO
        } else {
            self.blend_ratio.clamp(0.0, 1.0)
        };
        Self {
            history_capacity: self.history_capacity.max(1),
            blend_ratio,
            frame_duration_ms: self
                .frame_duration_ms
                .clamp(MIN_FRAME_DURATION_MS, MAX_FRAME_DURATION_MS),
            color_mode: self.color_mode,
        }
    }

    /// Transform the renderer should apply for the configured mode.
    #[must_use]
    pub fn color_transform(&self) -> Option<Box<dyn ColorTransform>> {
        self.color_mode
            .quantizer()
            .map(|q| Box::new(q) as Box<dyn ColorTransform>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_values() {
        assert_eq!(ColorMode::from_env_values("xterm", "truecolor"), ColorMode::TrueColor);
        assert_eq!(ColorMode::from_env_values("xterm", "24BIT"), ColorMode::TrueColor);
        assert_eq!(ColorMode::from_env_values("xterm-kitty", ""), ColorMode::TrueColor);
        assert_eq!(ColorMode::from_env_values("xterm-256color", ""), ColorMode::Color256);
        assert_eq!(ColorMode::from_env_values("screen", ""), ColorMode::Color16);
        assert_eq!(ColorMode::from_env_values("", ""), ColorMode::Color16);
    }

    #[test]
    fn test_quantizer_per_mode() {
        assert!(ColorMode::TrueColor.quantizer().is_none());
        assert_eq!(ColorMode::Color256.quantizer(), Some(Quantize::Xterm256));
        assert_eq!(ColorMode::Color16.quantizer(), Some(Quantize::Ansi16));
    }

    #[test]
    fn test_defaults() {
        let opts = EditorOptions::default();
        assert_eq!(opts.history_capacity, 50);
        assert!((opts.blend_ratio - 0.25).abs() < f32::EPSILON);
        assert_eq!(opts.frame_duration_ms, 100);
        assert!(opts.color_transform().is_none());
    }

    #[test]
    fn test_from_env_uses_detected_mode() {
        let opts = EditorOptions::from_env();
        assert_eq!(opts.color_mode, ColorMode::detect());
        assert_eq!(opts.history_capacity, EditorOptions::default().history_capacity);
    }

    #[test]
    fn test_normalized_clamps() {
        let opts = EditorOptions {
            history_capacity: 0,
            blend_ratio: 3.0,
            frame_duration_ms: 1,
            color_mode: ColorMode::Color16,
        }
        .normalized();
        assert_eq!(opts.history_capacity, 1);
        assert!((opts.blend_ratio - 1.0).abs() < f32::EPSILON);
        assert_eq!(opts.frame_duration_ms, MIN_FRAME_DURATION_MS);

        let nan = EditorOptions {
            blend_ratio: f32::NAN,
            ..EditorOptions::default()
        }
        .normalized();
        assert!((nan.blend_ratio - DEFAULT_BLEND_RATIO).abs() < f32::EPSILON);
    }
}
