//! Rectangular range selection driven by pointer events

use std::cmp;

use crate::grid::{ColumnId, GridModel, Merge, RowId};
use crate::util::CellRef;

/// Anchor/extent selection. The anchor is where the pointer went down; the extent follows
/// the pointer while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    anchor: CellRef,
    extent: CellRef,
    selecting: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> CellRef {
        self.anchor
    }

    pub fn extent(&self) -> CellRef {
        self.extent
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    // === Pointer events ===

    pub fn pointer_down(&mut self, row: usize, col: usize) {
        self.anchor = CellRef::new(row, col);
        self.extent = self.anchor;
        self.selecting = true;
    }

    /// Extend to (row, col) if a drag is in progress
    pub fn pointer_enter(&mut self, row: usize, col: usize) {
        if self.selecting {
            self.extent = CellRef::new(row, col);
        }
    }

    pub fn pointer_up(&mut self) {
        self.selecting = false;
    }

    // === Queries ===

    /// Normalized (start_row, end_row, start_col, end_col)
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (
            cmp::min(self.anchor.row, self.extent.row),
            cmp::max(self.anchor.row, self.extent.row),
            cmp::min(self.anchor.col, self.extent.col),
            cmp::max(self.anchor.col, self.extent.col),
        )
    }

    pub fn top_left(&self) -> CellRef {
        let (start_row, _, start_col, _) = self.bounds();
        CellRef::new(start_row, start_col)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        let (start_row, end_row, start_col, end_col) = self.bounds();
        (start_row..=end_row).contains(&row) && (start_col..=end_col).contains(&col)
    }

    pub fn is_single_cell(&self) -> bool {
        self.anchor == self.extent
    }

    pub fn row_count(&self) -> usize {
        let (start_row, end_row, _, _) = self.bounds();
        end_row - start_row + 1
    }

    pub fn col_count(&self) -> usize {
        let (_, _, start_col, end_col) = self.bounds();
        end_col - start_col + 1
    }

    /// The selected rectangle as a merge candidate
    pub fn to_merge(&self) -> Merge {
        let (start_row, end_row, start_col, end_col) = self.bounds();
        Merge::new(start_row, start_col, end_row, end_col)
    }

    /// Identities of the selected cells that exist in the grid, row-major
    pub fn cell_ids(&self, grid: &GridModel) -> Vec<(RowId, ColumnId)> {
        let (start_row, end_row, start_col, end_col) = self.bounds();
        let mut ids = Vec::new();
        for row in grid.rows().iter().skip(start_row).take(end_row - start_row + 1) {
            for col in grid.columns().iter().skip(start_col).take(end_col - start_col + 1) {
                ids.push((row.id, col.id));
            }
        }
        ids
    }

    /// Raw values of the selected rectangle, clipped to the grid
    pub fn values(&self, grid: &GridModel) -> Vec<Vec<String>> {
        if grid.row_count() == 0 || grid.column_count() == 0 {
            return Vec::new();
        }
        let (start_row, end_row, start_col, end_col) = self.bounds();
        let end_row = end_row.min(grid.row_count() - 1);
        let end_col = end_col.min(grid.column_count() - 1);
        if start_row > end_row || start_col > end_col {
            return Vec::new();
        }
        grid.values_in(start_row, end_row, start_col, end_col)
    }

    // === Programmatic changes ===

    pub fn collapse_to(&mut self, row: usize, col: usize) {
        self.anchor = CellRef::new(row, col);
        self.extent = self.anchor;
        self.selecting = false;
    }

    pub fn select_all(&mut self, grid: &GridModel) {
        self.anchor = CellRef::new(0, 0);
        self.extent = CellRef::new(
            grid.row_count().saturating_sub(1),
            grid.column_count().saturating_sub(1),
        );
        self.selecting = false;
    }

    /// Keep both corners inside the grid after rows or columns were removed
    pub fn clamp(&mut self, grid: &GridModel) {
        let max_row = grid.row_count().saturating_sub(1);
        let max_col = grid.column_count().saturating_sub(1);
        for corner in [&mut self.anchor, &mut self.extent] {
            corner.row = corner.row.min(max_row);
            corner.col = corner.col.min(max_col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SizeLimits;

    fn make_grid(rows: usize, cols: usize) -> GridModel {
        GridModel::seeded(SizeLimits::default(), cols, rows)
    }

    #[test]
    fn test_drag_selects_rectangle() {
        let mut sel = Selection::new();
        sel.pointer_down(3, 2);
        sel.pointer_enter(1, 4);
        sel.pointer_up();

        assert_eq!(sel.bounds(), (1, 3, 2, 4));
        assert_eq!(sel.top_left(), CellRef::new(1, 2));
        assert_eq!(sel.anchor(), CellRef::new(3, 2));
        assert!(sel.contains(2, 3));
        assert!(sel.contains(1, 4));
        assert!(!sel.contains(0, 2));
        assert_eq!((sel.row_count(), sel.col_count()), (3, 3));
    }

    #[test]
    fn test_enter_ignored_after_release() {
        let mut sel = Selection::new();
        sel.pointer_down(0, 0);
        sel.pointer_up();
        sel.pointer_enter(5, 5);

        assert!(sel.is_single_cell());
        assert!(!sel.is_selecting());
    }

    #[test]
    fn test_to_merge_normalizes() {
        let mut sel = Selection::new();
        sel.pointer_down(2, 2);
        sel.pointer_enter(0, 1);
        assert_eq!(sel.to_merge(), Merge::new(0, 1, 2, 2));
    }

    #[test]
    fn test_select_all_and_clamp() {
        let mut grid = make_grid(4, 3);
        let mut sel = Selection::new();
        sel.select_all(&grid);
        assert_eq!(sel.bounds(), (0, 3, 0, 2));

        let last = grid.row_at(3).unwrap().id;
        grid.delete_row(last).unwrap();
        sel.clamp(&grid);
        assert_eq!(sel.bounds(), (0, 2, 0, 2));
    }

    #[test]
    fn test_values_clipped_to_grid() {
        let mut grid = make_grid(2, 2);
        grid.set_value_at(1, 1, "x");
        let mut sel = Selection::new();
        sel.pointer_down(1, 1);
        sel.pointer_enter(7, 7);

        assert_eq!(sel.values(&grid), vec![vec!["x".to_string()]]);
        assert_eq!(sel.cell_ids(&grid).len(), 1);
    }

    #[test]
    fn test_collapse_to() {
        let mut sel = Selection::new();
        sel.pointer_down(0, 0);
        sel.pointer_enter(2, 2);
        sel.collapse_to(1, 1);
        assert!(sel.is_single_cell());
        assert_eq!(sel.bounds(), (1, 1, 1, 1));
    }
}
