//! Text layers.
//!
//! A text layer's grid is a pure function of its text, bounds, colors and
//! alignment. Every setter re-runs the layout, so the grid can never be
//! painted by hand or drift from the fields it was computed from.

use crate::cell::Cell;
use crate::color::{Color, Rgb};
use crate::grid::{COLS, Grid, ROWS};
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Horizontal alignment of each laid-out line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch inner gaps to the full width, except on a paragraph's last line.
    Justify,
}

impl TextAlign {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Inclusive cell rectangle a text layer lays out into. Only
/// [`TextBounds::new`] builds one, so the corners are always ordered and on
/// the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextBounds {
    r0: usize,
    c0: usize,
    r1: usize,
    c1: usize,
}

impl TextBounds {
    /// Build bounds from two corners in any order, clamped to the canvas.
    #[must_use]
    pub fn new(r0: usize, c0: usize, r1: usize, c1: usize) -> Self {
        let clamp_row = |r: usize| r.min(ROWS - 1);
        let clamp_col = |c: usize| c.min(COLS - 1);
        Self {
            r0: clamp_row(r0.min(r1)),
            c0: clamp_col(c0.min(c1)),
            r1: clamp_row(r0.max(r1)),
            c1: clamp_col(c0.max(c1)),
        }
    }

    /// `(r0, c0, r1, c1)`, top-left corner first.
    #[must_use]
    pub fn corners(&self) -> (usize, usize, usize, usize) {
        (self.r0, self.c0, self.r1, self.c1)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.c1 - self.c0 + 1
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.r1 - self.r0 + 1
    }
}

/// A text layer's editable fields plus its derived grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLayer {
    text: String,
    bounds: TextBounds,
    fg: Rgb,
    char_colors: BTreeMap<usize, Rgb>,
    align: TextAlign,
    grid: Grid,
}

impl TextLayer {
    #[must_use]
    pub fn new(bounds: TextBounds, fg: Rgb) -> Self {
        Self {
            text: String::new(),
            bounds,
            fg,
            char_colors: BTreeMap::new(),
            align: TextAlign::Left,
            grid: Grid::new(),
        }
    }

    /// Rebuild from stored fields.
    #[must_use]
    pub fn from_parts(
        text: impl Into<String>,
        bounds: TextBounds,
        fg: Rgb,
        char_colors: BTreeMap<usize, Rgb>,
        align: TextAlign,
    ) -> Self {
        let mut layer = Self {
            text: text.into(),
            bounds,
            fg,
            char_colors,
            align,
            grid: Grid::new(),
        };
        layer.relayout();
        layer
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn bounds(&self) -> TextBounds {
        self.bounds
    }

    #[must_use]
    pub fn fg(&self) -> Rgb {
        self.fg
    }

    #[must_use]
    pub fn align(&self) -> TextAlign {
        self.align
    }

    /// Per-grapheme color overrides keyed by grapheme index.
    #[must_use]
    pub fn char_colors(&self) -> &BTreeMap<usize, Rgb> {
        &self.char_colors
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.relayout();
    }

    pub fn set_bounds(&mut self, bounds: TextBounds) {
        self.bounds = bounds;
        self.relayout();
    }

    pub fn set_fg(&mut self, fg: Rgb) {
        self.fg = fg;
        self.relayout();
    }

    pub fn set_align(&mut self, align: TextAlign) {
        self.align = align;
        self.relayout();
    }

    /// Override (or with `None`, reset) the color of one grapheme.
    pub fn set_char_color(&mut self, index: usize, color: Option<Rgb>) {
        match color {
            Some(color) => self.char_colors.insert(index, color),
            None => self.char_colors.remove(&index),
        };
        self.relayout();
    }

    fn relayout(&mut self) {
        self.grid.clear();
        let width = self.bounds.width();
        let lines = layout_lines(&self.text, width);

        for (line_idx, line) in lines.iter().take(self.bounds.height()).enumerate() {
            let row = self.bounds.r0 + line_idx;
            for (offset, glyph) in place_line(line, width, self.align) {
                let fg = self.char_colors.get(&glyph.index).copied().unwrap_or(self.fg);
                self.grid.set(
                    row,
                    self.bounds.c0 + offset,
                    Cell {
                        ch: glyph.ch,
                        fg: Color::Rgb(fg),
                        bg: Color::Transparent,
                    },
                );
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Glyph {
    /// Grapheme index in the normalized text.
    index: usize,
    ch: char,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Word(Vec<Glyph>),
    Gap(usize),
}

impl Token {
    fn width(&self) -> usize {
        match self {
            Self::Word(glyphs) => glyphs.len(),
            Self::Gap(n) => *n,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Line {
    tokens: Vec<Token>,
    /// Last line of its paragraph (never justified).
    paragraph_end: bool,
}

impl Line {
    fn width(&self) -> usize {
        self.tokens.iter().map(Token::width).sum()
    }
}

/// Split text into paragraphs of word and gap tokens.
fn tokenize(text: &str) -> Vec<Vec<Token>> {
    let normalized: String = text.nfc().collect();
    let mut paragraphs: Vec<Vec<Token>> = Vec::new();
    let mut tokens = Vec::new();
    let mut word: Vec<Glyph> = Vec::new();
    let mut gap = 0usize;

    for (index, grapheme) in normalized.graphemes(true).enumerate() {
        if matches!(grapheme, "\n" | "\r\n" | "\r") {
            if !word.is_empty() {
                tokens.push(Token::Word(std::mem::take(&mut word)));
            }
            paragraphs.push(std::mem::take(&mut tokens));
            gap = 0;
            continue;
        }
        let Some(ch) = grapheme.chars().next() else {
            continue;
        };
        if ch == ' ' || ch == '\t' {
            if !word.is_empty() {
                tokens.push(Token::Word(std::mem::take(&mut word)));
            }
            gap += 1;
            continue;
        }
        if grapheme.width() == 0 {
            continue;
        }
        if gap > 0 {
            tokens.push(Token::Gap(gap));
            gap = 0;
        }
        word.push(Glyph { index, ch });
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    paragraphs.push(tokens);
    paragraphs
}

/// Greedy word wrap. Words wider than the box are hard-broken.
fn layout_lines(text: &str, width: usize) -> Vec<Line> {
    let mut lines = Vec::new();

    for paragraph in tokenize(text) {
        let mut line = Line::default();
        let mut pending_gap = 0usize;
        let mut wrapped = false;

        for token in paragraph {
            match token {
                Token::Gap(n) => {
                    // Leading gaps survive only at the start of a paragraph.
                    if line.tokens.is_empty() && wrapped {
                        continue;
                    }
                    pending_gap += n;
                }
                Token::Word(glyphs) => {
                    let used = line.width();
                    if used + pending_gap + glyphs.len() <= width {
                        if pending_gap > 0 {
                            line.tokens.push(Token::Gap(pending_gap));
                        }
                        line.tokens.push(Token::Word(glyphs));
                        pending_gap = 0;
                        continue;
                    }

                    if !line.tokens.is_empty() {
                        lines.push(std::mem::take(&mut line));
                        wrapped = true;
                        pending_gap = 0;
                    } else if pending_gap > 0 {
                        // Indentation alone overflows; drop it.
                        pending_gap = 0;
                    }

                    let mut rest = glyphs;
                    while rest.len() > width {
                        let tail = rest.split_off(width);
                        lines.push(Line {
                            tokens: vec![Token::Word(rest)],
                            paragraph_end: false,
                        });
                        wrapped = true;
                        rest = tail;
                    }
                    line.tokens.push(Token::Word(rest));
                }
            }
        }
        line.paragraph_end = true;
        lines.push(line);
    }
    lines
}

/// Column offsets of each glyph of a line after alignment.
fn place_line(line: &Line, width: usize, align: TextAlign) -> Vec<(usize, Glyph)> {
    let used = line.width();
    let slack = width.saturating_sub(used);
    let gaps = line
        .tokens
        .iter()
        .filter(|t| matches!(t, Token::Gap(_)))
        .count();

    let (start, extra_per_gap, mut remainder) = match align {
        TextAlign::Left => (0, 0, 0),
        TextAlign::Right => (slack, 0, 0),
        TextAlign::Center => (slack / 2, 0, 0),
        TextAlign::Justify if line.paragraph_end || gaps == 0 => (0, 0, 0),
        TextAlign::Justify => (0, slack / gaps, slack % gaps),
    };

    let mut placed = Vec::new();
    let mut col = start;
    for token in &line.tokens {
        match token {
            Token::Gap(n) => {
                col += n + extra_per_gap;
                if remainder > 0 {
                    col += 1;
                    remainder -= 1;
                }
            }
            Token::Word(glyphs) => {
                for glyph in glyphs {
                    placed.push((col, *glyph));
                    col += 1;
                }
            }
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(grid: &Grid, row: usize, c0: usize, c1: usize) -> String {
        (c0..=c1).map(|c| grid.cell(row, c).ch).collect()
    }

    fn layer(text: &str, width: usize, align: TextAlign) -> TextLayer {
        TextLayer::from_parts(
            text,
            TextBounds::new(0, 0, 3, width - 1),
            Rgb::WHITE,
            BTreeMap::new(),
            align,
        )
    }

    #[test]
    fn test_bounds_normalized_and_clamped() {
        let b = TextBounds::new(30, 90, 2, 5);
        assert_eq!(b.corners(), (2, 5, 24, 79));
        assert_eq!(b.width(), 75);
        assert_eq!(b.height(), 23);
        let point = TextBounds::new(24, 79, 24, 79);
        assert_eq!((point.width(), point.height()), (1, 1));
    }

    #[test]
    fn test_left_wrap() {
        let t = layer("hello big world", 10, TextAlign::Left);
        assert_eq!(row_text(t.grid(), 0, 0, 9), "hello big ");
        assert_eq!(row_text(t.grid(), 1, 0, 9), "world     ");
    }

    #[test]
    fn test_right_and_center() {
        let t = layer("abc", 7, TextAlign::Right);
        assert_eq!(row_text(t.grid(), 0, 0, 6), "    abc");
        let t = layer("abc", 7, TextAlign::Center);
        assert_eq!(row_text(t.grid(), 0, 0, 6), "  abc  ");
    }

    #[test]
    fn test_justify_skips_paragraph_last_line() {
        let t = layer("aa bb cc dd", 8, TextAlign::Justify);
        assert_eq!(row_text(t.grid(), 0, 0, 7), "aa bb cc");
        assert_eq!(row_text(t.grid(), 1, 0, 7), "dd      ");

        let t = layer("a b c ddddd", 7, TextAlign::Justify);
        assert_eq!(row_text(t.grid(), 0, 0, 6), "a  b  c");
    }

    #[test]
    fn test_long_word_hard_breaks() {
        let t = layer("abcdefgh", 3, TextAlign::Left);
        assert_eq!(row_text(t.grid(), 0, 0, 2), "abc");
        assert_eq!(row_text(t.grid(), 1, 0, 2), "def");
        assert_eq!(row_text(t.grid(), 2, 0, 2), "gh ");
    }

    #[test]
    fn test_newlines_and_height_clip() {
        let t = layer("a\nb\nc\nd\ne", 4, TextAlign::Left);
        assert_eq!(t.grid().cell(3, 0).ch, 'd');
        assert!(t.grid().iter().all(|(p, c)| p.row < 4 || c.is_blank()));
    }

    #[test]
    fn test_cells_have_transparent_background() {
        let t = layer("x", 4, TextAlign::Left);
        let cell = t.grid().cell(0, 0);
        assert_eq!(cell.bg, Color::Transparent);
        assert_eq!(cell.fg, Color::Rgb(Rgb::WHITE));
        assert!(t.grid().cell(0, 1).is_blank());
    }

    #[test]
    fn test_char_color_override_by_grapheme_index() {
        let mut t = layer("ab cd", 10, TextAlign::Left);
        t.set_char_color(3, Some(Rgb::RED));
        assert_eq!(t.grid().cell(0, 3).fg, Color::Rgb(Rgb::RED));
        assert_eq!(t.grid().cell(0, 4).fg, Color::Rgb(Rgb::WHITE));
        t.set_char_color(3, None);
        assert_eq!(t.grid().cell(0, 3).fg, Color::Rgb(Rgb::WHITE));
    }

    #[test]
    fn test_decomposed_accent_is_one_cell() {
        let t = layer("e\u{301}x", 5, TextAlign::Left);
        assert_eq!(t.grid().cell(0, 0).ch, '\u{e9}');
        assert_eq!(t.grid().cell(0, 1).ch, 'x');
    }

    #[test]
    fn test_setters_relayout() {
        let mut t = layer("hi", 10, TextAlign::Left);
        t.set_text("yo");
        assert_eq!(t.grid().cell(0, 0).ch, 'y');
        t.set_bounds(TextBounds::new(5, 5, 6, 10));
        assert!(t.grid().cell(0, 0).is_blank());
        assert_eq!(t.grid().cell(5, 5).ch, 'y');
        t.set_fg(Rgb::GREEN);
        assert_eq!(t.grid().cell(5, 5).fg, Color::Rgb(Rgb::GREEN));
        t.set_align(TextAlign::Right);
        assert_eq!(t.grid().cell(5, 10).ch, 'o');
    }

    #[test]
    fn test_leading_indent_kept_only_on_first_line() {
        let t = layer("  ab cd", 5, TextAlign::Left);
        assert_eq!(row_text(t.grid(), 0, 0, 4), "  ab ");
        assert_eq!(row_text(t.grid(), 1, 0, 4), "cd   ");
    }
}
