//! Contiguous-block helpers over the flat layer list.
//!
//! A group's block is the group entry followed by every layer whose parent
//! chain reaches the group. All helpers assume the block invariant holds on
//! entry.

use super::{Layer, LayerId};
use std::ops::Range;

pub(crate) fn index_of(layers: &[Layer], id: &LayerId) -> Option<usize> {
    layers.iter().position(|layer| &layer.id == id)
}

/// True if `ancestor` appears anywhere on `layer`'s parent chain.
pub(crate) fn is_descendant(layers: &[Layer], layer: &Layer, ancestor: &LayerId) -> bool {
    let mut parent = layer.parent_id.as_ref();
    // Bounded walk; a corrupt chain cannot loop forever.
    for _ in 0..layers.len() {
        match parent {
            None => return false,
            Some(id) if id == ancestor => return true,
            Some(id) => {
                parent = index_of(layers, id).and_then(|idx| layers[idx].parent_id.as_ref());
            }
        }
    }
    false
}

/// Exclusive end of the block starting at `index`.
pub(crate) fn block_end(layers: &[Layer], index: usize) -> usize {
    let head = &layers[index];
    if !head.is_group() {
        return index + 1;
    }
    let mut end = index + 1;
    while end < layers.len() && is_descendant(layers, &layers[end], &head.id) {
        end += 1;
    }
    end
}

/// Remove and return the block starting at `index`.
pub(crate) fn extract_block(layers: &mut Vec<Layer>, index: usize) -> Vec<Layer> {
    let end = block_end(layers, index);
    layers.drain(index..end).collect()
}

/// Insert a block at `index`, keeping its order.
pub(crate) fn insert_block(layers: &mut Vec<Layer>, index: usize, block: Vec<Layer>) {
    let index = index.min(layers.len());
    layers.splice(index..index, block);
}

/// Index range holding the members of `scope` (`None` = root level).
pub(crate) fn scope_range(layers: &[Layer], scope: Option<&LayerId>) -> Option<Range<usize>> {
    match scope {
        None => Some(0..layers.len()),
        Some(group) => {
            let idx = index_of(layers, group)?;
            layers[idx]
                .is_group()
                .then(|| idx + 1..block_end(layers, idx))
        }
    }
}

/// Positions where a sibling block may be inserted into `scope` without
/// splitting another sibling's block: each sibling's start plus the scope end.
pub(crate) fn sibling_boundaries(layers: &[Layer], scope: Option<&LayerId>) -> Vec<usize> {
    let Some(range) = scope_range(layers, scope) else {
        return Vec::new();
    };
    let mut bounds = Vec::new();
    let mut i = range.start;
    while i < range.end {
        bounds.push(i);
        i = block_end(layers, i);
    }
    bounds.push(range.end);
    bounds
}

/// Clamp `desired` into `scope` and snap forward to the next sibling
/// boundary so no nested block is split.
pub(crate) fn snap_insert(layers: &[Layer], scope: Option<&LayerId>, desired: usize) -> Option<usize> {
    let bounds = sibling_boundaries(layers, scope);
    let first = *bounds.first()?;
    let last = *bounds.last()?;
    let desired = desired.clamp(first, last);
    bounds.into_iter().find(|&b| b >= desired)
}
