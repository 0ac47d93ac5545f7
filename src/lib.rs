//! `ansicanvas` - layered character/pixel-art raster engine
//!
//! The canvas is a fixed 80x25 grid of colored terminal cells, each of which
//! can also hold two stacked half-block pixels. On top of it sit an ordered
//! layer stack with groups, a bottom-to-top compositor, bounded snapshot
//! undo/redo, pure drawing algorithms, and a diff renderer that emits the
//! minimal ANSI patch to a terminal sink.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::config::EditorOptions;
//! use ansicanvas::draw::{BrushMode, line_cells};
//! use ansicanvas::editor::Editor;
//! use ansicanvas::{Grid, Pos, Rgb};
//!
//! let mut editor = Editor::new(EditorOptions::default());
//! editor.attach(Vec::<String>::new());
//!
//! let brush = editor.brush('#', Rgb::WHITE, Rgb::BLUE, BrushMode::Brush);
//! let cells = line_cells(Pos::new(2, 2), Pos::new(2, 10), &brush, &Grid::new());
//! editor.apply_cells(&cells);
//!
//! assert_eq!(editor.composite().cell(2, 6).ch, '#');
//! ```

// Crate-level lint configuration
#![forbid(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow LayerState in layer etc
#![allow(clippy::missing_errors_doc)] // Errors are described on the Error enum
#![allow(clippy::missing_panics_doc)] // Panicking paths are test-only
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod ansi;
pub mod cell;
pub mod color;
pub mod composite;
pub mod config;
pub mod document;
pub mod draw;
pub mod editor;
pub mod error;
pub mod event;
pub mod export;
pub mod gesture;
pub mod grid;
pub mod history;
pub mod import;
pub mod layer;
pub mod renderer;

// Re-export core types at crate root
pub use cell::{Cell, HALF_BLOCK, Half};
pub use color::{Color, ColorTransform, Quantize, Rgb};
pub use error::{Error, Result};
pub use event::{LogLevel, clear_log_callback, emit_log, set_log_callback};
pub use grid::{COLS, Grid, PIXEL_ROWS, Pos, ROWS};

// Re-export the pipeline types
pub use composite::{composite, composite_cell};
pub use config::{ColorMode, EditorOptions};
pub use draw::{Brush, BrushMode, CellMap};
pub use editor::Editor;
pub use history::History;
pub use layer::{Layer, LayerId, LayerKind, LayerState, LayerTree, Placement};
pub use renderer::{RenderStats, TerminalBuffer, TerminalSink};
