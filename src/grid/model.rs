use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::merge::Merge;
use super::sizing::SizeLimits;
use super::style::CellStyle;
use crate::error::{GridError, Result};
use crate::util::{define_id, letters_from_col};

define_id!(
    /// Stable column identity; survives renames and reorders
    ColumnId
);
define_id!(
    /// Stable row identity
    RowId
);
define_id!(
    /// Identity of a stored cell record
    CellId
);

/// Advisory column type tag. Not enforced by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    Currency,
    Percentage,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(default)]
    pub kind: ColumnKind,
    pub width: u32,
    pub order: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub order: usize,
    pub height: u32,
    #[serde(default)]
    pub is_header: bool,
}

/// A stored cell. Cells without a record are empty and unstyled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn new(value: impl Into<String>) -> Self {
        Self { id: CellId::new(), value: value.into(), style: None }
    }

    pub fn has_style(&self) -> bool {
        self.style.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// A cell carrying neither a value nor a style need not be stored
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && !self.has_style()
    }
}

/// Where a new row goes relative to a reference index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

/// The canonical state of one sheet.
///
/// Columns and rows are kept in display order; their `order` field always equals their
/// position. Cells are keyed by identity so they follow their row/column through reorders.
#[derive(Debug, Clone, PartialEq)]
pub struct GridModel {
    columns: Vec<Column>,
    rows: Vec<Row>,
    cells: HashMap<RowId, HashMap<ColumnId, Cell>>,
    merges: Vec<Merge>,
    limits: SizeLimits,
}

impl Default for GridModel {
    fn default() -> Self {
        Self::new(SizeLimits::default())
    }
}

impl GridModel {
    /// An empty sheet with no columns or rows
    pub fn new(limits: SizeLimits) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            cells: HashMap::new(),
            merges: Vec::new(),
            limits,
        }
    }

    /// A blank grid of lettered columns and empty rows
    pub fn seeded(limits: SizeLimits, col_count: usize, row_count: usize) -> Self {
        let mut grid = Self::new(limits);
        for _ in 0..col_count.max(1) {
            grid.add_column();
        }
        for _ in 0..row_count.max(1) {
            grid.append_row();
        }
        grid
    }

    /// Rebuild a grid from stored parts.
    ///
    /// Columns and rows are ordered by their stored `order` and renumbered densely. Sizes are
    /// floored, cells pointing at unknown rows/columns are dropped (last record wins for
    /// duplicates), and merges outside the grid or overlapping an earlier merge are skipped.
    pub fn from_parts(
        limits: SizeLimits,
        mut columns: Vec<Column>,
        mut rows: Vec<Row>,
        cells: impl IntoIterator<Item = (RowId, ColumnId, Cell)>,
        merges: impl IntoIterator<Item = Merge>,
    ) -> Self {
        columns.sort_by_key(|c| c.order);
        rows.sort_by_key(|r| r.order);
        for column in columns.iter_mut() {
            column.width = limits.clamp_width(column.width);
        }
        for row in rows.iter_mut() {
            row.height = limits.clamp_height(row.height);
        }

        let mut grid = Self { columns, rows, cells: HashMap::new(), merges: Vec::new(), limits };
        grid.reindex();

        for (row_id, col_id, cell) in cells {
            if grid.row(row_id).is_some() && grid.column(col_id).is_some() && !cell.is_blank() {
                grid.cells.entry(row_id).or_default().insert(col_id, cell);
            }
        }

        for merge in merges {
            if grid.validate_merge(&merge).is_ok() {
                grid.merges.push(merge);
            }
        }
        grid
    }

    pub fn limits(&self) -> SizeLimits {
        self.limits
    }

    // === Read access ===

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn row_index(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    pub fn column_at(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn row_at(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn cell(&self, row: RowId, col: ColumnId) -> Option<&Cell> {
        self.cells.get(&row)?.get(&col)
    }

    /// Raw value of a cell; empty string when no record exists
    pub fn value(&self, row: RowId, col: ColumnId) -> &str {
        self.cell(row, col).map(|c| c.value.as_str()).unwrap_or("")
    }

    pub fn cell_at(&self, row_idx: usize, col_idx: usize) -> Option<&Cell> {
        let row = self.rows.get(row_idx)?;
        let col = self.columns.get(col_idx)?;
        self.cell(row.id, col.id)
    }

    /// Raw value by index position; empty string outside the grid
    pub fn value_at(&self, row_idx: usize, col_idx: usize) -> &str {
        self.cell_at(row_idx, col_idx).map(|c| c.value.as_str()).unwrap_or("")
    }

    pub fn style_at(&self, row_idx: usize, col_idx: usize) -> Option<&CellStyle> {
        self.cell_at(row_idx, col_idx)?.style.as_ref()
    }

    /// Every stored cell in display order (row-major)
    pub fn cells(&self) -> Vec<(RowId, ColumnId, &Cell)> {
        let mut out = Vec::new();
        for row in &self.rows {
            let Some(row_cells) = self.cells.get(&row.id) else {
                continue;
            };
            for column in &self.columns {
                if let Some(cell) = row_cells.get(&column.id) {
                    out.push((row.id, column.id, cell));
                }
            }
        }
        out
    }

    /// Number of stored cell records
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(|m| m.len()).sum()
    }

    /// Raw values of the rectangle `[start_row..=end_row] x [start_col..=end_col]`
    pub fn values_in(&self, start_row: usize, end_row: usize, start_col: usize, end_col: usize) -> Vec<Vec<String>> {
        (start_row..=end_row)
            .map(|r| {
                (start_col..=end_col)
                    .map(|c| self.value_at(r, c).to_string())
                    .collect()
            })
            .collect()
    }

    // === Mutable access for sibling modules ===

    pub(super) fn column_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    pub(super) fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    pub(super) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub(super) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub(super) fn rows_vec_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub(super) fn merges_mut(&mut self) -> &mut Vec<Merge> {
        &mut self.merges
    }

    /// Renumber `order` fields to match positions
    pub(super) fn reindex(&mut self) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.order = i;
        }
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.order = i;
        }
    }

    // === Columns ===

    /// Letter name for a column created at position `idx`, skipping names already in use
    fn next_column_name(&self, mut idx: usize) -> String {
        loop {
            let name = letters_from_col(idx);
            if !self.columns.iter().any(|c| c.name == name) {
                return name;
            }
            idx += 1;
        }
    }

    /// Append a column named by continuing the letter sequence
    pub fn add_column(&mut self) -> ColumnId {
        let name = self.next_column_name(self.columns.len());
        self.insert_column_at(self.columns.len(), name)
    }

    /// Insert a named column at `idx` (clamped to the end)
    pub fn insert_column_at(&mut self, idx: usize, name: impl Into<String>) -> ColumnId {
        let idx = idx.min(self.columns.len());
        let id = ColumnId::new();
        self.columns.insert(idx, Column {
            id,
            name: name.into(),
            kind: ColumnKind::Text,
            width: self.limits.default_column_width,
            order: idx,
        });
        self.reindex();
        id
    }

    /// Delete a column and strip its cells from every row. The last column cannot go.
    pub fn delete_column(&mut self, id: ColumnId) -> Result<()> {
        let idx = self.column_index(id).ok_or(GridError::UnknownColumn(id))?;
        if self.columns.len() <= 1 {
            return Err(GridError::LastColumn);
        }
        self.columns.remove(idx);
        for row_cells in self.cells.values_mut() {
            row_cells.remove(&id);
        }
        self.cells.retain(|_, m| !m.is_empty());
        self.reindex();
        self.prune_merges();
        Ok(())
    }

    pub fn rename_column(&mut self, id: ColumnId, name: impl Into<String>) -> Result<()> {
        let column = self.column_mut(id).ok_or(GridError::UnknownColumn(id))?;
        column.name = name.into();
        Ok(())
    }

    pub fn set_column_kind(&mut self, id: ColumnId, kind: ColumnKind) -> Result<()> {
        let column = self.column_mut(id).ok_or(GridError::UnknownColumn(id))?;
        column.kind = kind;
        Ok(())
    }

    // === Rows ===

    /// Append a blank row at the bottom
    pub fn append_row(&mut self) -> RowId {
        let id = RowId::new();
        self.rows.push(Row {
            id,
            order: self.rows.len(),
            height: self.limits.default_row_height,
            is_header: false,
        });
        id
    }

    /// Insert a blank row above or below the row at `at` (clamped into the grid)
    pub fn insert_row(&mut self, at: usize, placement: Placement) -> RowId {
        let idx = if self.rows.is_empty() {
            0
        } else {
            let at = at.min(self.rows.len() - 1);
            match placement {
                Placement::Above => at,
                Placement::Below => at + 1,
            }
        };
        let id = RowId::new();
        self.rows.insert(idx, Row {
            id,
            order: idx,
            height: self.limits.default_row_height,
            is_header: false,
        });
        self.reindex();
        id
    }

    /// Delete a row and its cells. The last row cannot go.
    pub fn delete_row(&mut self, id: RowId) -> Result<()> {
        let idx = self.row_index(id).ok_or(GridError::UnknownRow(id))?;
        if self.rows.len() <= 1 {
            return Err(GridError::LastRow);
        }
        self.rows.remove(idx);
        self.cells.remove(&id);
        self.reindex();
        self.prune_merges();
        Ok(())
    }

    /// Copy a row (values, styles, height, header flag) into a new row directly below it.
    /// Copied cells get fresh identities bound to the new row.
    pub fn duplicate_row(&mut self, id: RowId) -> Result<RowId> {
        let idx = self.row_index(id).ok_or(GridError::UnknownRow(id))?;
        let source = self.rows[idx].clone();
        let new_id = RowId::new();
        self.rows.insert(idx + 1, Row { id: new_id, ..source });

        if let Some(source_cells) = self.cells.get(&id) {
            let copies: HashMap<ColumnId, Cell> = source_cells
                .iter()
                .map(|(col, cell)| {
                    (*col, Cell { id: CellId::new(), value: cell.value.clone(), style: cell.style.clone() })
                })
                .collect();
            self.cells.insert(new_id, copies);
        }
        self.reindex();
        Ok(new_id)
    }

    pub fn set_row_header(&mut self, id: RowId, is_header: bool) -> Result<()> {
        let row = self.row_mut(id).ok_or(GridError::UnknownRow(id))?;
        row.is_header = is_header;
        Ok(())
    }

    // === Cells ===

    fn check_address(&self, row: RowId, col: ColumnId) -> Result<()> {
        if self.row(row).is_none() {
            return Err(GridError::UnknownRow(row));
        }
        if self.column(col).is_none() {
            return Err(GridError::UnknownColumn(col));
        }
        Ok(())
    }

    /// Drop the record at (row, col) if it no longer carries anything
    fn compact(&mut self, row: RowId, col: ColumnId) {
        if let Some(row_cells) = self.cells.get_mut(&row) {
            if row_cells.get(&col).is_some_and(|c| c.is_blank()) {
                row_cells.remove(&col);
            }
            if row_cells.is_empty() {
                self.cells.remove(&row);
            }
        }
    }

    /// Set a cell's raw value, keeping any style it has
    pub fn set_cell_value(&mut self, row: RowId, col: ColumnId, value: impl Into<String>) -> Result<()> {
        self.check_address(row, col)?;
        let value = value.into();
        self.cells
            .entry(row)
            .or_default()
            .entry(col)
            .and_modify(|c| c.value = value.clone())
            .or_insert_with(|| Cell::new(value));
        self.compact(row, col);
        Ok(())
    }

    /// Index-addressed variant of `set_cell_value`; `false` when outside the grid
    pub fn set_value_at(&mut self, row_idx: usize, col_idx: usize, value: impl Into<String>) -> bool {
        let (Some(row), Some(col)) = (self.rows.get(row_idx), self.columns.get(col_idx)) else {
            return false;
        };
        let (row, col) = (row.id, col.id);
        self.set_cell_value(row, col, value).is_ok()
    }

    /// Overlay a partial style onto a cell; fields not set in `patch` are left alone
    pub fn apply_style(&mut self, row: RowId, col: ColumnId, patch: &CellStyle) -> Result<()> {
        self.check_address(row, col)?;
        let cell = self.cells.entry(row).or_default().entry(col).or_insert_with(|| Cell::new(""));
        cell.style.get_or_insert_with(CellStyle::default).merge(patch);
        if cell.style.as_ref().is_some_and(|s| s.is_empty()) {
            cell.style = None;
        }
        self.compact(row, col);
        Ok(())
    }

    /// Remove every style field from a cell
    pub fn clear_style(&mut self, row: RowId, col: ColumnId) -> Result<()> {
        self.check_address(row, col)?;
        if let Some(cell) = self.cells.get_mut(&row).and_then(|m| m.get_mut(&col)) {
            cell.style = None;
        }
        self.compact(row, col);
        Ok(())
    }
}
