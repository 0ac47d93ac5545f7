//! Property-based tests for undo/redo over the layer tree.
//!
//! Random sequences of editing operations are replayed through an `Editor`,
//! then unwound with undo and re-applied with redo.

use ansicanvas::cell::Cell;
use ansicanvas::color::Rgb;
use ansicanvas::config::EditorOptions;
use ansicanvas::editor::Editor;
use ansicanvas::grid::{COLS, Grid, ROWS};
use ansicanvas::layer::Placement;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

#[derive(Clone, Debug)]
enum Op {
    Paint(usize, usize, char, u8),
    Add,
    RemoveActive,
    DuplicateActive,
    WrapActive,
    UngroupActive,
    MergeDownActive,
    HideActive,
    AddFrame,
    Reorder(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..ROWS, 0..COLS, prop::char::range('a', 'z'), any::<u8>())
            .prop_map(|(r, c, ch, shade)| Op::Paint(r, c, ch, shade)),
        2 => Just(Op::Add),
        1 => Just(Op::RemoveActive),
        1 => Just(Op::DuplicateActive),
        1 => Just(Op::WrapActive),
        1 => Just(Op::UngroupActive),
        1 => Just(Op::MergeDownActive),
        1 => Just(Op::HideActive),
        1 => Just(Op::AddFrame),
        1 => (0usize..8).prop_map(Op::Reorder),
    ]
}

fn apply(editor: &mut Editor<Vec<String>>, op: &Op) {
    let active = editor.tree().state().active_layer_id().clone();
    match *op {
        Op::Paint(row, col, ch, shade) => {
            editor.paint_cell(row, col, Cell::new(ch, Rgb::new(shade, 0, 255 - shade), Rgb::BLACK));
        }
        Op::Add => {
            editor.add_layer();
        }
        Op::RemoveActive => {
            editor.edit(|tree| tree.remove(&active));
        }
        Op::DuplicateActive => {
            editor.edit(|tree| tree.duplicate(&active));
        }
        Op::WrapActive => {
            editor.edit(|tree| tree.wrap_in_group(&active));
        }
        Op::UngroupActive => {
            editor.edit(|tree| tree.remove_from_group(&active));
        }
        Op::MergeDownActive => {
            editor.edit(|tree| tree.merge_down(&active));
        }
        Op::HideActive => {
            editor.edit(|tree| tree.set_visible(&active, false));
        }
        Op::AddFrame => {
            editor.edit(|tree| tree.add_frame());
        }
        Op::Reorder(index) => {
            editor.edit(|tree| tree.reorder(&active, index, Placement::SameScope));
        }
    }
}

fn new_editor() -> Editor<Vec<String>> {
    let mut editor = Editor::new(EditorOptions::default());
    editor.attach(Vec::new());
    editor
}

// ============================================================================
// History Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Undoing every recorded step returns to the initial picture and state.
    #[test]
    fn undo_all_restores_initial(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut editor = new_editor();
        let initial_state = editor.tree().snapshot();
        let initial_grid = editor.composite().clone();

        for op in &ops {
            apply(&mut editor, op);
        }
        let steps = editor.history().undo_len();
        prop_assert!(steps <= ops.len());
        for _ in 0..steps {
            prop_assert!(editor.undo());
        }
        prop_assert!(!editor.undo());
        prop_assert_eq!(editor.composite(), &initial_grid);
        prop_assert_eq!(editor.tree().state(), &initial_state);
    }

    /// Redo right after undo restores exactly what was on screen.
    #[test]
    fn redo_after_undo_is_identity(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let mut editor = new_editor();
        for op in &ops {
            apply(&mut editor, op);
        }
        let before: Grid = editor.composite().clone();
        let state = editor.tree().snapshot();
        if editor.undo() {
            prop_assert!(editor.redo());
        }
        prop_assert_eq!(editor.composite(), &before);
        prop_assert_eq!(editor.tree().state(), &state);
    }

    /// A new edit after undo discards the redo stack.
    #[test]
    fn edit_after_undo_clears_redo(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let mut editor = new_editor();
        for op in &ops {
            apply(&mut editor, op);
        }
        editor.add_layer();
        prop_assert!(editor.undo());
        prop_assert!(editor.history().can_redo());
        editor.add_layer();
        prop_assert!(!editor.history().can_redo());
    }

    /// The displayed composite always matches a fresh composite of the tree.
    #[test]
    fn cached_composite_tracks_tree(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let mut editor = new_editor();
        for op in &ops {
            apply(&mut editor, op);
            prop_assert_eq!(
                editor.composite(),
                &ansicanvas::composite(editor.tree().layers())
            );
        }
    }
}

#[test]
fn history_is_bounded_to_fifty_steps() {
    let mut editor = new_editor();
    for i in 0..51 {
        let col = i % COLS;
        let row = i / COLS;
        assert!(editor.paint_cell(row, col, Cell::new('x', Rgb::WHITE, Rgb::BLACK)));
    }
    assert_eq!(editor.history().undo_len(), 50);

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    // The very first paint fell off the bottom of the stack.
    assert_eq!(editor.composite().cell(0, 0).ch, 'x');
    assert!(editor.composite().cell(0, 1).is_blank());
}
