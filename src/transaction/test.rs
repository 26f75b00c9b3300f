use std::sync::Arc;

use super::history::*;
use super::state::*;
use super::transaction::*;

use crate::clipboard::PasteLimits;
use crate::error::GridError;
use crate::grid::{CellStyle, ColumnId, GridModel, Merge, Placement, RowId, SizeLimits, SortDirection};
use crate::util::CellRef;

fn make_grid(rows: usize, cols: usize) -> GridModel {
    GridModel::seeded(SizeLimits::default(), cols, rows)
}

fn make_grid_with_data(data: Vec<Vec<&str>>) -> GridModel {
    let cols = data.first().map(|r| r.len()).unwrap_or(1);
    let mut grid = make_grid(data.len(), cols);
    for (r, row) in data.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            grid.set_value_at(r, c, *value);
        }
    }
    grid
}

fn ids(grid: &GridModel, r: usize, c: usize) -> (RowId, ColumnId) {
    (grid.row_at(r).unwrap().id, grid.column_at(c).unwrap().id)
}

fn set_cell(grid: &GridModel, r: usize, c: usize, value: &str) -> Transaction {
    let (row, col) = ids(grid, r, c);
    Transaction::SetCell { row, col, value: value.to_string() }
}

// === Transaction tests ===

#[test]
fn test_set_cell_apply_leaves_input_untouched() {
    let grid = make_grid(3, 3);
    let next = set_cell(&grid, 1, 1, "hello").apply(&grid).unwrap();

    assert_eq!(next.value_at(1, 1), "hello");
    assert_eq!(grid.value_at(1, 1), "");
}

#[test]
fn test_set_cell_unknown_row() {
    let grid = make_grid(2, 2);
    let other = make_grid(1, 1);
    let txn = set_cell(&other, 0, 0, "x");
    assert!(matches!(txn.apply(&grid), Err(GridError::UnknownRow(_))));
}

#[test]
fn test_apply_and_clear_style() {
    let grid = make_grid(2, 2);
    let cells = vec![ids(&grid, 0, 0), ids(&grid, 1, 1)];
    let styled = Transaction::ApplyStyle { cells: cells.clone(), style: CellStyle::default().with_bold(true) }
        .apply(&grid)
        .unwrap();

    assert_eq!(styled.style_at(0, 0).and_then(|s| s.bold), Some(true));
    assert_eq!(styled.style_at(1, 1).and_then(|s| s.bold), Some(true));
    assert!(styled.style_at(0, 1).is_none());

    let cleared = Transaction::ClearStyle { cells }.apply(&styled).unwrap();
    assert!(cleared.style_at(0, 0).is_none());
    assert_eq!(cleared.cell_count(), 0);
}

#[test]
fn test_delete_last_column_rejected() {
    let grid = make_grid(2, 1);
    let col = grid.column_at(0).unwrap().id;
    assert_eq!(Transaction::DeleteColumn(col).apply(&grid), Err(GridError::LastColumn));
}

#[test]
fn test_insert_row_below() {
    let grid = make_grid_with_data(vec![vec!["a"], vec!["b"]]);
    let next = Transaction::InsertRow { at: 0, placement: Placement::Below }.apply(&grid).unwrap();

    assert_eq!(next.row_count(), 3);
    assert_eq!(next.value_at(0, 0), "a");
    assert_eq!(next.value_at(1, 0), "");
    assert_eq!(next.value_at(2, 0), "b");
}

#[test]
fn test_sort_transaction() {
    let grid = make_grid_with_data(vec![vec!["10"], vec!["2"], vec!["abc"], vec![""]]);
    let col = grid.column_at(0).unwrap().id;
    let next = Transaction::Sort { col, direction: SortDirection::Ascending }.apply(&grid).unwrap();

    let values: Vec<&str> = (0..4).map(|r| next.value_at(r, 0)).collect();
    assert_eq!(values, vec!["", "2", "10", "abc"]);
}

#[test]
fn test_resize_floors() {
    let grid = make_grid(1, 1);
    let col = grid.column_at(0).unwrap().id;
    let next = Transaction::ResizeColumn { col, width: 10 }.apply(&grid).unwrap();
    assert_eq!(next.column_at(0).unwrap().width, 50);
}

#[test]
fn test_merge_and_unmerge() {
    let grid = make_grid(3, 3);
    let merged = Transaction::Merge(Merge::new(0, 0, 1, 1)).apply(&grid).unwrap();
    assert!(merged.is_hidden(1, 1));

    let unmerged = Transaction::Unmerge { row: 1, col: 1 }.apply(&merged).unwrap();
    assert!(unmerged.merges().is_empty());

    assert_eq!(Transaction::Unmerge { row: 0, col: 0 }.apply(&grid), Err(GridError::NotMerged));
}

#[test]
fn test_paste_transaction_grows() {
    let grid = make_grid(1, 1);
    let txn = Transaction::Paste {
        anchor: CellRef::new(0, 0),
        block: vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string(), "d".to_string()]],
        limits: PasteLimits::default(),
    };
    let next = txn.apply(&grid).unwrap();
    assert_eq!(next.row_count(), 2);
    assert_eq!(next.column_count(), 2);
    assert_eq!(next.value_at(1, 1), "d");
}

#[test]
fn test_empty_paste_rejected() {
    let grid = make_grid(1, 1);
    let txn = Transaction::Paste { anchor: CellRef::new(0, 0), block: Vec::new(), limits: PasteLimits::default() };
    assert_eq!(txn.apply(&grid), Err(GridError::EmptyPaste));
}

#[test]
fn test_batch_is_all_or_nothing() {
    let grid = make_grid(2, 2);
    let batch = Transaction::Batch(vec![
        set_cell(&grid, 0, 0, "a"),
        Transaction::Unmerge { row: 0, col: 0 },
    ]);
    assert_eq!(batch.apply(&grid), Err(GridError::NotMerged));
    assert_eq!(grid.value_at(0, 0), "");

    let batch = Transaction::Batch(vec![set_cell(&grid, 0, 0, "a"), set_cell(&grid, 1, 1, "b")]);
    let next = batch.apply(&grid).unwrap();
    assert_eq!(next.value_at(0, 0), "a");
    assert_eq!(next.value_at(1, 1), "b");
}

// === History tests ===

#[test]
fn test_history_undo_redo() {
    let mut history = History::new(10);
    let first = Arc::new(make_grid(1, 1));
    let second = Arc::new(make_grid(2, 2));

    history.record(Arc::clone(&first));
    assert!(history.can_undo());

    let restored = history.undo(Arc::clone(&second)).unwrap();
    assert!(Arc::ptr_eq(&restored, &first));
    assert!(history.can_redo());

    let again = history.redo(restored).unwrap();
    assert!(Arc::ptr_eq(&again, &second));
}

#[test]
fn test_history_record_clears_redo() {
    let mut history = History::new(10);
    history.record(Arc::new(make_grid(1, 1)));
    history.undo(Arc::new(make_grid(1, 2)));
    assert!(history.can_redo());

    history.record(Arc::new(make_grid(1, 3)));
    assert!(!history.can_redo());
}

#[test]
fn test_history_depth_is_bounded() {
    let mut history = History::new(3);
    for cols in 1..=5 {
        history.record(Arc::new(make_grid(1, cols)));
    }
    assert_eq!(history.undo_depth(), 3);

    // Oldest entries went first
    let current = Arc::new(make_grid(1, 6));
    let a = history.undo(current).unwrap();
    let b = history.undo(Arc::clone(&a)).unwrap();
    let c = history.undo(Arc::clone(&b)).unwrap();
    assert_eq!(c.column_count(), 3);
    assert!(history.undo(c).is_none());
}

// === GridState tests ===

#[test]
fn test_dispatch_bumps_version() {
    let mut state = GridState::new(make_grid(2, 2), 100);
    let txn = set_cell(state.grid(), 0, 0, "x");

    assert!(state.dispatch(&txn).unwrap());
    assert_eq!(state.version(), 1);
    assert_eq!(state.grid().value_at(0, 0), "x");
}

#[test]
fn test_noop_dispatch_not_recorded() {
    let mut state = GridState::new(make_grid(2, 2), 100);
    let txn = set_cell(state.grid(), 0, 0, "");

    assert!(!state.dispatch(&txn).unwrap());
    assert_eq!(state.version(), 0);
    assert!(!state.history().can_undo());
}

#[test]
fn test_failed_dispatch_keeps_state() {
    let mut state = GridState::new(make_grid(2, 1), 100);
    let col = state.grid().column_at(0).unwrap().id;
    let before = state.snapshot();

    assert_eq!(state.dispatch(&Transaction::DeleteColumn(col)), Err(GridError::LastColumn));
    assert!(Arc::ptr_eq(&before, &state.snapshot()));
    assert_eq!(state.version(), 0);
}

#[test]
fn test_old_snapshots_stay_consistent() {
    let mut state = GridState::new(make_grid(2, 2), 100);
    let before = state.snapshot();
    let txn = set_cell(state.grid(), 1, 1, "after");
    state.dispatch(&txn).unwrap();

    assert_eq!(before.value_at(1, 1), "");
    assert_eq!(state.grid().value_at(1, 1), "after");
}

#[test]
fn test_state_undo_redo() {
    let mut state = GridState::new(make_grid(2, 2), 100);
    let first = set_cell(state.grid(), 0, 0, "one");
    let second = set_cell(state.grid(), 0, 0, "two");
    state.dispatch(&first).unwrap();
    state.dispatch(&second).unwrap();

    state.undo().unwrap();
    assert_eq!(state.grid().value_at(0, 0), "one");
    state.undo().unwrap();
    assert_eq!(state.grid().value_at(0, 0), "");
    assert_eq!(state.undo(), Err(GridError::NothingToUndo));

    state.redo().unwrap();
    assert_eq!(state.grid().value_at(0, 0), "one");
    assert_eq!(state.version(), 5);
}

#[test]
fn test_redo_empty() {
    let mut state = GridState::new(make_grid(1, 1), 100);
    assert_eq!(state.redo(), Err(GridError::NothingToRedo));
}

#[test]
fn test_gesture_commits_as_one_step() {
    let mut state = GridState::new(make_grid(1, 1), 100);
    let col = state.grid().column_at(0).unwrap().id;

    for width in [130, 150, 180] {
        state.preview(&Transaction::ResizeColumn { col, width }).unwrap();
    }
    assert!(state.in_gesture());
    assert_eq!(state.grid().column_at(0).unwrap().width, 180);

    assert!(state.commit_gesture());
    assert!(!state.in_gesture());
    assert_eq!(state.history().undo_depth(), 1);

    state.undo().unwrap();
    assert_eq!(state.grid().column_at(0).unwrap().width, 120);
}

#[test]
fn test_committed_excludes_open_gesture() {
    let mut state = GridState::new(make_grid(1, 1), 100);
    let col = state.grid().column_at(0).unwrap().id;
    assert_eq!(state.committed().column_at(0).unwrap().width, 120);

    state.preview(&Transaction::ResizeColumn { col, width: 240 }).unwrap();
    assert_eq!(state.grid().column_at(0).unwrap().width, 240);
    assert_eq!(state.committed().column_at(0).unwrap().width, 120);

    assert!(state.commit_gesture());
    assert_eq!(state.committed().column_at(0).unwrap().width, 240);
}

#[test]
fn test_gesture_cancel_restores() {
    let mut state = GridState::new(make_grid(1, 1), 100);
    let row = state.grid().row_at(0).unwrap().id;

    state.preview(&Transaction::ResizeRow { row, height: 90 }).unwrap();
    state.cancel_gesture();

    assert_eq!(state.grid().row_at(0).unwrap().height, 32);
    assert!(!state.history().can_undo());
}

#[test]
fn test_replace_discards_history() {
    let mut state = GridState::new(make_grid(1, 1), 100);
    let txn = set_cell(state.grid(), 0, 0, "x");
    state.dispatch(&txn).unwrap();

    state.replace(make_grid(3, 3));
    assert_eq!(state.grid().row_count(), 3);
    assert!(!state.history().can_undo());
}
