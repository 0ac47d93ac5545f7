//! The editing pipeline.
//!
//! [`Editor`] wires the components together in the order every interaction
//! follows:
//!
//! ```text
//! snapshot -> mutate LayerTree -> record History -> composite -> flush
//! ```
//!
//! History is only recorded when an operation actually changed the state, so
//! refused operations never leave empty undo steps behind.
//!
//! # Gestures
//!
//! Line, shape and move tools preview on every pointer move. A gesture
//! captures the state at [`begin_gesture`](Editor::begin_gesture); each
//! [`preview_gesture`](Editor::preview_gesture) restores that base before
//! applying the new preview, so previews never accumulate. Ending the
//! gesture either commits it as one undo step or restores the base.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::config::EditorOptions;
//! use ansicanvas::editor::Editor;
//! use ansicanvas::{Cell, Rgb};
//!
//! let mut editor = Editor::new(EditorOptions::default());
//! editor.attach(String::new());
//!
//! editor.paint_cell(0, 0, Cell::new('#', Rgb::RED, Rgb::BLACK));
//! assert_eq!(editor.composite().cell(0, 0).ch, '#');
//!
//! assert!(editor.undo());
//! assert!(editor.composite().cell(0, 0).is_blank());
//! ```

use crate::cell::Cell;
use crate::color::{ColorTransform, Quantize, Rgb};
use crate::composite::{composite, composite_cell};
use crate::config::{ColorMode, EditorOptions};
use crate::document;
use crate::draw::{Brush, BrushMode, CellMap};
use crate::error::Result;
use crate::event::{LogLevel, emit_log};
use crate::export;
use crate::grid::Grid;
use crate::history::History;
use crate::import::DecodedImage;
use crate::layer::{LayerId, LayerState, LayerTree};
use crate::renderer::{TerminalBuffer, TerminalSink};
use std::path::Path;

/// Layer tree, history and renderer driven as one unit.
pub struct Editor<S: TerminalSink> {
    tree: LayerTree,
    history: History<LayerState>,
    terminal: TerminalBuffer<S>,
    options: EditorOptions,
    quantize: Option<Quantize>,
    composite: Grid,
    /// Pre-gesture state while a gesture is in progress.
    gesture_base: Option<LayerState>,
}

impl<S: TerminalSink> Editor<S> {
    /// A new document with one blank "Background" layer.
    #[must_use]
    pub fn new(options: EditorOptions) -> Self {
        Self::with_tree(LayerTree::new(), options)
    }

    /// Edit an existing tree.
    #[must_use]
    pub fn with_tree(tree: LayerTree, options: EditorOptions) -> Self {
        let options = options.normalized();
        let composite = composite(tree.layers());
        Self {
            tree,
            history: History::new(options.history_capacity),
            terminal: TerminalBuffer::new(),
            quantize: options.color_mode.quantizer(),
            options,
            composite,
            gesture_base: None,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &LayerTree {
        &self.tree
    }

    #[must_use]
    pub fn history(&self) -> &History<LayerState> {
        &self.history
    }

    #[must_use]
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// The grid as last composited.
    #[must_use]
    pub fn composite(&self) -> &Grid {
        &self.composite
    }

    #[must_use]
    pub fn terminal(&self) -> &TerminalBuffer<S> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut TerminalBuffer<S> {
        &mut self.terminal
    }

    /// Attach a sink and repaint it in full. Returns the previous sink.
    pub fn attach(&mut self, sink: S) -> Option<S> {
        let previous = self.terminal.attach(sink);
        self.flush();
        previous
    }

    pub fn detach(&mut self) -> Option<S> {
        self.terminal.detach()
    }

    /// A brush carrying the configured blend ratio.
    #[must_use]
    pub fn brush(&self, ch: char, fg: Rgb, bg: Rgb, mode: BrushMode) -> Brush {
        Brush::new(ch, fg, bg)
            .with_mode(mode)
            .with_blend_ratio(self.options.blend_ratio)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Run one operation against the tree as a single undo step.
    ///
    /// The pre-operation state is recorded only if the operation changed it.
    /// An open gesture is committed first.
    pub fn edit<R>(&mut self, op: impl FnOnce(&mut LayerTree) -> R) -> R {
        self.end_gesture(true);
        let before = self.tree.snapshot();
        let result = op(&mut self.tree);
        if self.tree.state() != &before {
            self.history.record(before);
            self.render();
        }
        result
    }

    /// Append a blank layer using the configured frame duration.
    pub fn add_layer(&mut self) -> LayerId {
        let duration = self.options.frame_duration_ms;
        self.edit(|tree| {
            let id = tree.add();
            tree.set_frame_duration(duration);
            id
        })
    }

    /// Apply a drawing result to the active layer.
    ///
    /// Inside a gesture the cells accumulate on top of earlier ones and
    /// become part of the gesture's single undo step.
    pub fn apply_cells(&mut self, cells: &CellMap) -> bool {
        if self.gesture_base.is_some() {
            let changed = self.tree.apply_cells(cells);
            if changed {
                self.render();
            }
            return changed;
        }
        self.edit(|tree| tree.apply_cells(cells))
    }

    /// Paint one cell of the active layer and update only that screen cell.
    pub fn paint_cell(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        let before = self.gesture_base.is_none().then(|| self.tree.snapshot());
        if !self.tree.apply_to_active_layer(row, col, cell) {
            return false;
        }
        if let Some(before) = before {
            self.history.record(before);
        }
        let shown = composite_cell(self.tree.layers(), row, col);
        self.composite.set(row, col, shown);
        let transform = self.quantize.as_ref().map(|q| q as &dyn ColorTransform);
        self.terminal.write_cell(row, col, shown, transform);
        true
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Start a gesture. An already open gesture is committed first.
    pub fn begin_gesture(&mut self) {
        self.end_gesture(true);
        self.gesture_base = Some(self.tree.snapshot());
    }

    #[must_use]
    pub fn in_gesture(&self) -> bool {
        self.gesture_base.is_some()
    }

    /// Replace the previous preview with `cells`.
    ///
    /// Returns `false` when no gesture is open.
    pub fn preview_gesture(&mut self, cells: &CellMap) -> bool {
        let Some(base) = &self.gesture_base else {
            return false;
        };
        self.tree.restore(base.clone());
        self.tree.apply_cells(cells);
        self.render();
        true
    }

    /// Finish the open gesture.
    ///
    /// With `commit`, the pre-gesture state becomes one undo step if
    /// anything changed. Without it, that state is restored and both history
    /// stacks are left untouched. Returns whether the state moved.
    pub fn end_gesture(&mut self, commit: bool) -> bool {
        let Some(base) = self.gesture_base.take() else {
            return false;
        };
        if self.tree.state() == &base {
            return false;
        }
        if commit {
            self.history.record(base);
        } else {
            self.tree.restore(base);
            self.render();
        }
        true
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Restore the most recent snapshot. An open gesture is cancelled first.
    pub fn undo(&mut self) -> bool {
        self.end_gesture(false);
        let Some(previous) = self.history.undo(self.tree.snapshot()) else {
            return false;
        };
        self.tree.restore(previous);
        self.render();
        true
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> bool {
        self.end_gesture(false);
        let Some(next) = self.history.redo(self.tree.snapshot()) else {
            return false;
        };
        self.tree.restore(next);
        self.render();
        true
    }

    // ========================================================================
    // Color mode
    // ========================================================================

    /// Switch the palette and repaint everything under the new mapping.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if mode == self.options.color_mode {
            return;
        }
        self.options.color_mode = mode;
        self.quantize = mode.quantizer();
        self.terminal.invalidate();
        self.flush();
    }

    // ========================================================================
    // Files and images
    // ========================================================================

    /// Fold a decoded image into a new top layer named after its file.
    pub fn import_image(&mut self, image: &DecodedImage) -> LayerId {
        let name = Path::new(image.file())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Image")
            .to_string();
        let grid = image.to_grid();
        let duration = self.options.frame_duration_ms;
        self.edit(|tree| {
            let id = tree.add_with_grid(name, grid);
            tree.set_frame_duration(duration);
            id
        })
    }

    /// Validate and import a raw RGBA buffer.
    pub fn import_rgba(
        &mut self,
        file: &str,
        rgba: Vec<u8>,
        width: usize,
        height: usize,
    ) -> Result<LayerId> {
        let image = DecodedImage::new(file, rgba, width, height)?;
        Ok(self.import_image(&image))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        document::save_to_path(path, self.tree.state())
    }

    /// Replace the document. History is cleared; on error nothing changes.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let state = document::load_from_path(path)?;
        self.gesture_base = None;
        self.tree = LayerTree::from_state(state);
        self.history.clear();
        self.terminal.invalidate();
        self.render();
        Ok(())
    }

    /// The current composite as ANSI text.
    #[must_use]
    pub fn export_ansi(&self) -> String {
        export::to_ansi(&self.composite)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn render(&mut self) {
        self.composite = composite(self.tree.layers());
        self.flush();
    }

    fn flush(&mut self) {
        let transform = self.quantize.as_ref().map(|q| q as &dyn ColorTransform);
        let written = self.terminal.flush(&self.composite, transform);
        if written > 0 {
            emit_log(LogLevel::Debug, &format!("flushed {written} cells"));
        }
    }
}

impl<S: TerminalSink> std::fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("layers", &self.tree.layers().len())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .field("in_gesture", &self.gesture_base.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
