//! Layer data model.
//!
//! The layer stack is a flat, ordered list (index 0 = bottom) of [`Layer`]
//! records. Groups do not own their members; membership is a `parent_id`
//! back-reference instead. Every member of a group, direct or nested, sits in
//! one unbroken run immediately after the group's own entry (the contiguous
//! block invariant). [`LayerState::check_invariants`] verifies this and the
//! tree operations in [`LayerTree`] preserve it.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::layer::LayerTree;
//!
//! let mut tree = LayerTree::new();
//! let id = tree.add();
//! assert_eq!(tree.layer(&id).unwrap().name, "Layer 2");
//! assert_eq!(tree.state().active_layer_id(), &id);
//!
//! let group = tree.wrap_in_group(&id).unwrap();
//! assert!(tree.remove(&group));
//! assert_eq!(tree.layers().len(), 2);
//! ```

mod block;
mod text;
mod tree;

pub use text::{TextAlign, TextBounds, TextLayer};
pub use tree::{LayerTree, Placement};

pub(crate) use block::{block_end, index_of};

use crate::cell::Cell;
use crate::grid::Grid;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Shortest allowed frame duration in milliseconds.
pub const MIN_FRAME_DURATION_MS: u32 = 16;
/// Longest allowed frame duration in milliseconds.
pub const MAX_FRAME_DURATION_MS: u32 = 10_000;
/// Frame duration of new layers in milliseconds.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Unique, stable layer identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(String);

impl LayerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Animation frames of a drawn layer. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Animation {
    frames: Vec<Grid>,
    current: usize,
    duration_ms: u32,
}

impl Animation {
    /// One blank frame.
    #[must_use]
    pub fn new() -> Self {
        Self::with_grid(Grid::new())
    }

    /// One frame holding `grid`.
    #[must_use]
    pub fn with_grid(grid: Grid) -> Self {
        Self {
            frames: vec![grid],
            current: 0,
            duration_ms: DEFAULT_FRAME_DURATION_MS,
        }
    }

    /// Rebuild from stored parts; `None` if `frames` is empty.
    #[must_use]
    pub fn from_parts(frames: Vec<Grid>, current: usize, duration_ms: u32) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        let current = current.min(frames.len() - 1);
        Some(Self {
            frames,
            current,
            duration_ms: clamp_duration(duration_ms),
        })
    }

    #[must_use]
    pub fn frames(&self) -> &[Grid] {
        &self.frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    #[must_use]
    pub fn current(&self) -> &Grid {
        &self.frames[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Grid {
        &mut self.frames[self.current]
    }

    /// Insert a blank frame after the current one and select it.
    pub fn add_frame(&mut self) {
        self.current += 1;
        self.frames.insert(self.current, Grid::new());
    }

    /// Insert a copy of the current frame after it and select the copy.
    pub fn duplicate_frame(&mut self) {
        let copy = self.current().clone();
        self.current += 1;
        self.frames.insert(self.current, copy);
    }

    /// Remove a frame. Refused when it is the only frame.
    pub fn remove_frame(&mut self, index: usize) -> bool {
        if self.frames.len() <= 1 || index >= self.frames.len() {
            return false;
        }
        self.frames.remove(index);
        if self.current > index || self.current >= self.frames.len() {
            self.current = self.current.saturating_sub(1);
        }
        true
    }

    pub fn set_current(&mut self, index: usize) -> bool {
        if index >= self.frames.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    /// Move a frame; the current frame keeps following the same grid.
    pub fn reorder_frame(&mut self, from: usize, to: usize) -> bool {
        let len = self.frames.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let frame = self.frames.remove(from);
        self.frames.insert(to, frame);
        self.current = if self.current == from {
            to
        } else if from < self.current && self.current <= to {
            self.current - 1
        } else if to <= self.current && self.current < from {
            self.current + 1
        } else {
            self.current
        };
        true
    }

    /// Set the playback duration, clamped to the allowed range.
    pub fn set_duration(&mut self, duration_ms: u32) -> bool {
        let duration_ms = clamp_duration(duration_ms);
        if duration_ms == self.duration_ms {
            return false;
        }
        self.duration_ms = duration_ms;
        true
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_duration(duration_ms: u32) -> u32 {
    duration_ms.clamp(MIN_FRAME_DURATION_MS, MAX_FRAME_DURATION_MS)
}

/// What a layer holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// Hand-painted frames.
    Drawn(Animation),
    /// Laid-out text; its grid is derived, never painted.
    Text(TextLayer),
    /// Organizational container without a grid.
    Group { collapsed: bool },
}

/// One entry of the layer stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub parent_id: Option<LayerId>,
    pub kind: LayerKind,
}

impl Layer {
    #[must_use]
    pub fn drawn(id: LayerId, name: impl Into<String>, animation: Animation) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            parent_id: None,
            kind: LayerKind::Drawn(animation),
        }
    }

    #[must_use]
    pub fn text(id: LayerId, name: impl Into<String>, text: TextLayer) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            parent_id: None,
            kind: LayerKind::Text(text),
        }
    }

    #[must_use]
    pub fn group(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            parent_id: None,
            kind: LayerKind::Group { collapsed: false },
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: Option<LayerId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { .. })
    }

    /// Drawn and text layers are drawable; groups are not.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        !self.is_group()
    }

    /// The grid this layer currently shows, if it has one.
    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        match &self.kind {
            LayerKind::Drawn(animation) => Some(animation.current()),
            LayerKind::Text(text) => Some(text.grid()),
            LayerKind::Group { .. } => None,
        }
    }

    /// The cell this layer shows at a position.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid().and_then(|grid| grid.get(row, col).copied())
    }

    #[must_use]
    pub fn animation(&self) -> Option<&Animation> {
        match &self.kind {
            LayerKind::Drawn(animation) => Some(animation),
            _ => None,
        }
    }

    #[must_use]
    pub fn text_layer(&self) -> Option<&TextLayer> {
        match &self.kind {
            LayerKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The whole layer stack plus the active selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerState {
    pub(crate) layers: Vec<Layer>,
    pub(crate) active_layer_id: LayerId,
}

impl LayerState {
    /// Build a state from stored parts, validating every invariant.
    pub fn from_parts(layers: Vec<Layer>, active_layer_id: LayerId) -> Result<Self, String> {
        let state = Self {
            layers,
            active_layer_id,
        };
        state.check_invariants()?;
        Ok(state)
    }

    /// Layers bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn active_layer_id(&self) -> &LayerId {
        &self.active_layer_id
    }

    #[must_use]
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| &layer.id == id)
    }

    #[must_use]
    pub fn active_layer(&self) -> Option<&Layer> {
        self.layer(&self.active_layer_id)
    }

    #[must_use]
    pub fn drawable_count(&self) -> usize {
        self.layers.iter().filter(|layer| layer.is_drawable()).count()
    }

    /// Verify unique ids, a valid active id, at least one drawable layer,
    /// parents that are earlier groups, and contiguous group blocks.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(&layer.id) {
                return Err(format!("duplicate layer id {}", layer.id));
            }
        }
        if !seen.contains(&self.active_layer_id) {
            return Err(format!("active layer {} does not exist", self.active_layer_id));
        }
        if self.drawable_count() == 0 {
            return Err("no drawable layer".to_string());
        }

        // Groups whose block is still open, innermost last.
        let mut open: Vec<&LayerId> = Vec::new();
        for layer in &self.layers {
            match &layer.parent_id {
                None => open.clear(),
                Some(parent) => {
                    while open.last().is_some_and(|top| *top != parent) {
                        open.pop();
                    }
                    if open.is_empty() {
                        return Err(format!(
                            "layer {} is outside the block of its parent {parent}",
                            layer.id
                        ));
                    }
                }
            }
            if layer.is_group() {
                open.push(&layer.id);
            }
        }
        Ok(())
    }

    /// Per-layer visibility after applying every ancestor group's flag.
    #[must_use]
    pub fn effective_visibility(&self) -> Vec<bool> {
        effective_visibility(&self.layers)
    }
}

/// A layer is shown only if it and all of its ancestor groups are visible.
#[must_use]
pub fn effective_visibility(layers: &[Layer]) -> Vec<bool> {
    let mut group_visible: HashMap<&LayerId, bool> = HashMap::new();
    let mut out = Vec::with_capacity(layers.len());
    for layer in layers {
        let parent_visible = layer
            .parent_id
            .as_ref()
            .is_none_or(|parent| group_visible.get(parent).copied().unwrap_or(true));
        let visible = layer.visible && parent_visible;
        if layer.is_group() {
            group_visible.insert(&layer.id, visible);
        }
        out.push(visible);
    }
    out
}
