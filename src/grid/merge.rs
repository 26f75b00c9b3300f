//! Merged regions and the rules that keep them consistent

use std::cmp;

use serde::{Deserialize, Serialize};

use super::model::GridModel;
use crate::error::{GridError, Result};

/// A rectangular merged region in index space (zero-based, inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merge {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Merge {
    /// Build a merge from any two opposite corners; bounds are normalized per axis
    pub fn new(row_a: usize, col_a: usize, row_b: usize, col_b: usize) -> Self {
        Self {
            start_row: cmp::min(row_a, row_b),
            start_col: cmp::min(col_a, col_b),
            end_row: cmp::max(row_a, row_b),
            end_col: cmp::max(col_a, col_b),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.start_row <= row && row <= self.end_row && self.start_col <= col && col <= self.end_col
    }

    pub fn overlaps(&self, other: &Merge) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    pub fn is_anchor(&self, row: usize, col: usize) -> bool {
        row == self.start_row && col == self.start_col
    }

    pub fn row_span(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_span(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

impl GridModel {
    /// Check a candidate merge against the grid bounds and the existing merges
    pub fn validate_merge(&self, merge: &Merge) -> Result<()> {
        if merge.start_row > merge.end_row || merge.start_col > merge.end_col {
            return Err(GridError::MergeOutOfBounds);
        }
        if merge.is_single_cell() {
            return Err(GridError::SingleCellMerge);
        }
        if merge.end_row >= self.row_count() || merge.end_col >= self.column_count() {
            return Err(GridError::MergeOutOfBounds);
        }
        if self.merges().iter().any(|m| m.overlaps(merge)) {
            return Err(GridError::OverlappingMerge);
        }
        Ok(())
    }

    /// Record a new merge. Nested and overlapping merges are rejected.
    pub fn add_merge(&mut self, merge: Merge) -> Result<()> {
        self.validate_merge(&merge)?;
        self.merges_mut().push(merge);
        Ok(())
    }

    /// Remove the merge covering (row, col). Cell data is untouched.
    pub fn remove_merge_at(&mut self, row: usize, col: usize) -> Result<Merge> {
        let idx = self
            .merges()
            .iter()
            .position(|m| m.contains(row, col))
            .ok_or(GridError::NotMerged)?;
        Ok(self.merges_mut().remove(idx))
    }

    pub fn merge_at(&self, row: usize, col: usize) -> Option<&Merge> {
        self.merges().iter().find(|m| m.contains(row, col))
    }

    /// True for cells absorbed into a merge: inside one but not its top-left anchor.
    /// These are neither rendered nor edited independently.
    pub fn is_hidden(&self, row: usize, col: usize) -> bool {
        self.merge_at(row, col).is_some_and(|m| !m.is_anchor(row, col))
    }

    /// Rendered (row_span, col_span) of a visible cell; `None` for hidden cells
    pub fn span_at(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        match self.merge_at(row, col) {
            Some(m) if m.is_anchor(row, col) => Some((m.row_span(), m.col_span())),
            Some(_) => None,
            None => Some((1, 1)),
        }
    }

    /// Resolve (row, col) to the cell that actually owns it for editing
    pub fn owner_of(&self, row: usize, col: usize) -> (usize, usize) {
        match self.merge_at(row, col) {
            Some(m) => (m.start_row, m.start_col),
            None => (row, col),
        }
    }

    /// Drop merges that no longer fit inside the grid
    pub(super) fn prune_merges(&mut self) {
        let (rows, cols) = (self.row_count(), self.column_count());
        self.merges_mut().retain(|m| m.end_row < rows && m.end_col < cols);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let m = Merge::new(3, 4, 1, 2);
        assert_eq!(m, Merge { start_row: 1, start_col: 2, end_row: 3, end_col: 4 });
        assert_eq!(m.row_span(), 3);
        assert_eq!(m.col_span(), 3);
    }

    #[test]
    fn test_overlaps() {
        let a = Merge::new(0, 0, 1, 1);
        assert!(a.overlaps(&Merge::new(1, 1, 2, 2)));
        assert!(!a.overlaps(&Merge::new(2, 0, 3, 1)));
        assert!(!a.overlaps(&Merge::new(0, 2, 0, 3)));
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_string(&Merge::new(0, 1, 2, 3)).unwrap();
        assert_eq!(json, r#"{"startRow":0,"startCol":1,"endRow":2,"endCol":3}"#);
    }
}
