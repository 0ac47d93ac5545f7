//! Structural operations over the flat layer list.
//!
//! Every mutating method returns whether the state changed. Invalid targets
//! and illegal moves are silent no-ops that leave the state untouched, so a
//! caller mid-gesture never has to handle an error.

use super::block::{
    block_end, extract_block, index_of, insert_block, is_descendant, snap_insert,
};
use super::{Animation, Layer, LayerId, LayerKind, LayerState, TextAlign, TextBounds, TextLayer};
use crate::cell::Cell;
use crate::color::Rgb;
use crate::composite::merge_cell;
use crate::draw::CellMap;
use crate::event::{LogLevel, emit_log};
use crate::grid::{COLS, Grid, ROWS};
use std::collections::HashMap;

const BACKGROUND_NAME: &str = "Background";

/// Where [`LayerTree::reorder`] places the moved block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Stay among the current siblings.
    SameScope,
    /// Become a direct member of a group.
    IntoGroup(LayerId),
    /// Move to the root level.
    Root,
}

/// Owner of the live [`LayerState`] and its naming counters.
#[derive(Clone, Debug)]
pub struct LayerTree {
    state: LayerState,
    next_id: u64,
    next_name: u64,
    next_group: u64,
}

impl LayerTree {
    /// One blank "Background" layer.
    #[must_use]
    pub fn new() -> Self {
        let id = LayerId::new("layer-1");
        let state = LayerState {
            layers: vec![Layer::drawn(id.clone(), BACKGROUND_NAME, Animation::new())],
            active_layer_id: id,
        };
        Self {
            state,
            next_id: 2,
            next_name: 2,
            next_group: 1,
        }
    }

    /// Adopt a loaded state; counters start past every number it uses.
    #[must_use]
    pub fn from_state(state: LayerState) -> Self {
        let mut tree = Self {
            state,
            next_id: 1,
            next_name: 1,
            next_group: 1,
        };
        tree.bump_counters();
        tree
    }

    #[must_use]
    pub fn state(&self) -> &LayerState {
        &self.state
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.state.layers
    }

    #[must_use]
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.state.layer(id)
    }

    #[must_use]
    pub fn active_layer(&self) -> Option<&Layer> {
        self.state.active_layer()
    }

    /// Deep copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> LayerState {
        self.state.clone()
    }

    /// Replace the whole state. Naming counters never move backwards.
    pub fn restore(&mut self, state: LayerState) {
        self.state = state;
        self.bump_counters();
        self.debug_check();
    }

    // ========================================================================
    // Creation and removal
    // ========================================================================

    /// Append a blank drawn layer named "Layer N" and activate it.
    pub fn add(&mut self) -> LayerId {
        let name = self.default_name();
        self.add_with_grid(name, Grid::new())
    }

    /// Append a drawn layer holding `grid` and activate it.
    pub fn add_with_grid(&mut self, name: impl Into<String>, grid: Grid) -> LayerId {
        let id = self.fresh_id();
        self.push_top(Layer::drawn(id.clone(), name, Animation::with_grid(grid)))
    }

    /// Append an empty text layer and activate it.
    pub fn add_text(&mut self, name: impl Into<String>, bounds: TextBounds, fg: Rgb) -> LayerId {
        let id = self.fresh_id();
        self.push_top(Layer::text(id.clone(), name, TextLayer::new(bounds, fg)))
    }

    fn push_top(&mut self, layer: Layer) -> LayerId {
        let id = layer.id.clone();
        self.state.layers.push(layer);
        self.state.active_layer_id = id.clone();
        self.debug_check();
        id
    }

    /// Remove a layer. Groups hand their members to their own parent.
    pub fn remove(&mut self, id: &LayerId) -> bool {
        let Some(idx) = index_of(&self.state.layers, id) else {
            return false;
        };
        let layer = &self.state.layers[idx];
        if layer.is_drawable() && self.state.drawable_count() <= 1 {
            emit_log(LogLevel::Debug, "refusing to remove the last drawable layer");
            return false;
        }

        if layer.is_group() {
            let parent = layer.parent_id.clone();
            let end = block_end(&self.state.layers, idx);
            for member in &mut self.state.layers[idx + 1..end] {
                if member.parent_id.as_ref() == Some(id) {
                    member.parent_id = parent.clone();
                }
            }
        }
        self.state.layers.remove(idx);

        if &self.state.active_layer_id == id {
            if let Some(fallback) = self.newest_drawable() {
                self.state.active_layer_id = fallback;
            }
        }
        self.debug_check();
        true
    }

    /// The most recently created drawable layer, by the sequence number in
    /// the ids this tree hands out. Ids from elsewhere rank below those and
    /// fall back to list position among themselves.
    fn newest_drawable(&self) -> Option<LayerId> {
        self.state
            .layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.is_drawable())
            .max_by_key(|(idx, layer)| (numbered(layer.id.as_str(), "layer-"), *idx))
            .map(|(_, layer)| layer.id.clone())
    }

    /// Copy a layer (a group copies its whole block) right after the
    /// original's block. The copy becomes active.
    pub fn duplicate(&mut self, id: &LayerId) -> Option<LayerId> {
        let idx = index_of(&self.state.layers, id)?;
        let end = block_end(&self.state.layers, idx);
        let mut block: Vec<Layer> = self.state.layers[idx..end].to_vec();

        let mut renamed: HashMap<LayerId, LayerId> = HashMap::new();
        for layer in &mut block {
            let fresh = self.fresh_id();
            renamed.insert(layer.id.clone(), fresh.clone());
            layer.id = fresh;
        }
        for layer in block.iter_mut().skip(1) {
            if let Some(parent) = layer.parent_id.as_ref().and_then(|p| renamed.get(p)) {
                layer.parent_id = Some(parent.clone());
            }
        }

        let head = &mut block[0];
        head.name = format!("{} copy", head.name);
        let head_id = head.id.clone();

        insert_block(&mut self.state.layers, end, block);
        self.state.active_layer_id = head_id.clone();
        self.debug_check();
        Some(head_id)
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Move a layer's block to `new_index`.
    ///
    /// The index addresses the list with the moving block already taken out.
    /// It is clamped to the target scope and snapped forward so it never
    /// lands inside another sibling's block.
    pub fn reorder(&mut self, id: &LayerId, new_index: usize, placement: Placement) -> bool {
        let layers = &self.state.layers;
        let Some(idx) = index_of(layers, id) else {
            return false;
        };
        let old_parent = layers[idx].parent_id.clone();
        let scope = match placement {
            Placement::SameScope => old_parent.clone(),
            Placement::Root => None,
            Placement::IntoGroup(group) => {
                let Some(gidx) = index_of(layers, &group) else {
                    return false;
                };
                if !layers[gidx].is_group() {
                    return false;
                }
                if &group == id || is_descendant(layers, &layers[gidx], id) {
                    emit_log(LogLevel::Debug, "refusing to move a group into itself");
                    return false;
                }
                Some(group)
            }
        };

        let mut block = extract_block(&mut self.state.layers, idx);
        match snap_insert(&self.state.layers, scope.as_ref(), new_index) {
            Some(at) if at != idx || scope != old_parent => {
                block[0].parent_id = scope;
                insert_block(&mut self.state.layers, at, block);
                self.debug_check();
                true
            }
            _ => {
                insert_block(&mut self.state.layers, idx, block);
                false
            }
        }
    }

    /// Put a new group directly above the target's slot and move the target
    /// into it. Returns the group's id.
    pub fn wrap_in_group(&mut self, id: &LayerId) -> Option<LayerId> {
        let idx = index_of(&self.state.layers, id)?;
        let group_id = self.fresh_id();
        let name = format!("Group {}", self.next_group);
        self.next_group += 1;

        let parent = self.state.layers[idx].parent_id.clone();
        self.state.layers[idx].parent_id = Some(group_id.clone());
        self.state
            .layers
            .insert(idx, Layer::group(group_id.clone(), name).with_parent(parent));
        self.debug_check();
        Some(group_id)
    }

    /// Lift a layer (or group block) one level up, placing it right after
    /// its former parent's block.
    pub fn remove_from_group(&mut self, id: &LayerId) -> bool {
        let Some(idx) = index_of(&self.state.layers, id) else {
            return false;
        };
        let Some(parent) = self.state.layers[idx].parent_id.clone() else {
            return false;
        };
        let Some(pidx) = index_of(&self.state.layers, &parent) else {
            return false;
        };
        let grandparent = self.state.layers[pidx].parent_id.clone();

        let mut block = extract_block(&mut self.state.layers, idx);
        block[0].parent_id = grandparent;
        let at = block_end(&self.state.layers, pidx);
        insert_block(&mut self.state.layers, at, block);
        self.debug_check();
        true
    }

    /// Flatten a layer onto the drawn sibling directly below it, then drop it.
    pub fn merge_down(&mut self, id: &LayerId) -> bool {
        let Some(idx) = index_of(&self.state.layers, id) else {
            return false;
        };
        if idx == 0 {
            return false;
        }
        let (lower_part, upper_part) = self.state.layers.split_at_mut(idx);
        let upper = &upper_part[0];
        let lower = &mut lower_part[idx - 1];
        if upper.is_group() || lower.is_group() || upper.parent_id != lower.parent_id {
            emit_log(LogLevel::Debug, "refusing merge down across a group");
            return false;
        }
        let (Some(top), LayerKind::Drawn(animation)) = (upper.grid(), &mut lower.kind) else {
            emit_log(LogLevel::Debug, "refusing merge down onto a text layer");
            return false;
        };
        let target = animation.current_mut();
        for row in 0..ROWS {
            for col in 0..COLS {
                let merged = merge_cell(top.cell(row, col), target.cell(row, col));
                target.set(row, col, merged);
            }
        }

        let lower_id = lower.id.clone();
        self.state.layers.remove(idx);
        if &self.state.active_layer_id == id {
            self.state.active_layer_id = lower_id;
        }
        self.debug_check();
        true
    }

    // ========================================================================
    // Housekeeping
    // ========================================================================

    pub fn rename(&mut self, id: &LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.layer_mut(id) {
            Some(layer) if layer.name != name => {
                layer.name = name;
                true
            }
            _ => false,
        }
    }

    pub fn set_visible(&mut self, id: &LayerId, visible: bool) -> bool {
        match self.layer_mut(id) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    pub fn set_active(&mut self, id: &LayerId) -> bool {
        if &self.state.active_layer_id == id || self.layer(id).is_none() {
            return false;
        }
        self.state.active_layer_id = id.clone();
        true
    }

    pub fn set_collapsed(&mut self, id: &LayerId, collapsed: bool) -> bool {
        match self.layer_mut(id).map(|layer| &mut layer.kind) {
            Some(LayerKind::Group { collapsed: current }) if *current != collapsed => {
                *current = collapsed;
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Frames (active drawn layer only)
    // ========================================================================

    pub fn add_frame(&mut self) -> bool {
        self.active_animation_mut()
            .map(Animation::add_frame)
            .is_some()
    }

    pub fn duplicate_frame(&mut self) -> bool {
        self.active_animation_mut()
            .map(Animation::duplicate_frame)
            .is_some()
    }

    pub fn remove_frame(&mut self, index: usize) -> bool {
        self.active_animation_mut()
            .is_some_and(|animation| animation.remove_frame(index))
    }

    pub fn set_current_frame(&mut self, index: usize) -> bool {
        self.active_animation_mut()
            .is_some_and(|animation| animation.set_current(index))
    }

    pub fn reorder_frame(&mut self, from: usize, to: usize) -> bool {
        self.active_animation_mut()
            .is_some_and(|animation| animation.reorder_frame(from, to))
    }

    pub fn set_frame_duration(&mut self, duration_ms: u32) -> bool {
        self.active_animation_mut()
            .is_some_and(|animation| animation.set_duration(duration_ms))
    }

    // ========================================================================
    // Painting
    // ========================================================================

    /// Write one cell into the active drawn layer's current frame.
    pub fn apply_to_active_layer(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        let Some(animation) = self.active_animation_mut() else {
            return false;
        };
        match animation.current_mut().get_mut(row, col) {
            Some(slot) if *slot != cell => {
                *slot = cell;
                true
            }
            _ => false,
        }
    }

    /// Write a drawing result into the active drawn layer's current frame.
    pub fn apply_cells(&mut self, cells: &CellMap) -> bool {
        let Some(animation) = self.active_animation_mut() else {
            return false;
        };
        let grid = animation.current_mut();
        let mut changed = false;
        for (pos, cell) in cells {
            if let Some(slot) = grid.get_mut(pos.row, pos.col) {
                if slot != cell {
                    *slot = *cell;
                    changed = true;
                }
            }
        }
        changed
    }

    // ========================================================================
    // Text
    // ========================================================================

    pub fn set_text(&mut self, id: &LayerId, text: &str) -> bool {
        self.edit_text(id, |layer| layer.text() != text, |layer| layer.set_text(text))
    }

    pub fn set_text_bounds(&mut self, id: &LayerId, bounds: TextBounds) -> bool {
        self.edit_text(id, |layer| layer.bounds() != bounds, |layer| layer.set_bounds(bounds))
    }

    pub fn set_text_align(&mut self, id: &LayerId, align: TextAlign) -> bool {
        self.edit_text(id, |layer| layer.align() != align, |layer| layer.set_align(align))
    }

    pub fn set_text_color(&mut self, id: &LayerId, fg: Rgb) -> bool {
        self.edit_text(id, |layer| layer.fg() != fg, |layer| layer.set_fg(fg))
    }

    pub fn set_char_color(&mut self, id: &LayerId, index: usize, color: Option<Rgb>) -> bool {
        self.edit_text(
            id,
            |layer| layer.char_colors().get(&index).copied() != color,
            |layer| layer.set_char_color(index, color),
        )
    }

    fn edit_text(
        &mut self,
        id: &LayerId,
        differs: impl FnOnce(&TextLayer) -> bool,
        apply: impl FnOnce(&mut TextLayer),
    ) -> bool {
        match self.layer_mut(id).map(|layer| &mut layer.kind) {
            Some(LayerKind::Text(text)) if differs(text) => {
                apply(text);
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.state.layers.iter_mut().find(|layer| &layer.id == id)
    }

    fn active_animation_mut(&mut self) -> Option<&mut Animation> {
        let id = self.state.active_layer_id.clone();
        match self.layer_mut(&id).map(|layer| &mut layer.kind) {
            Some(LayerKind::Drawn(animation)) => Some(animation),
            _ => None,
        }
    }

    fn default_name(&mut self) -> String {
        let name = format!("Layer {}", self.next_name);
        self.next_name += 1;
        name
    }

    fn fresh_id(&mut self) -> LayerId {
        loop {
            let id = LayerId::new(format!("layer-{}", self.next_id));
            self.next_id += 1;
            if index_of(&self.state.layers, &id).is_none() {
                return id;
            }
        }
    }

    fn bump_counters(&mut self) {
        let count = self.state.layers.len() as u64;
        self.next_name = self.next_name.max(count + 1);
        for layer in &self.state.layers {
            if let Some(n) = numbered(layer.id.as_str(), "layer-") {
                self.next_id = self.next_id.max(n + 1);
            }
            if let Some(n) = numbered(&layer.name, "Layer ") {
                self.next_name = self.next_name.max(n + 1);
            }
            if let Some(n) = numbered(&layer.name, "Group ") {
                self.next_group = self.next_group.max(n + 1);
            }
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.state.check_invariants().is_ok(),
            "layer invariants broken: {:?}",
            self.state.check_invariants()
        );
    }
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

fn numbered(s: &str, prefix: &str) -> Option<u64> {
    s.strip_prefix(prefix)?.parse().ok()
}
