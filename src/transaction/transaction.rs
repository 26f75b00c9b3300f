use crate::clipboard::{paste_block, PasteLimits};
use crate::error::{GridError, Result};
use crate::grid::{CellStyle, ColumnId, ColumnKind, GridModel, Merge, Placement, RowId, SortDirection};
use crate::util::CellRef;

/// A single edit to a sheet
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    /// Set a single raw cell value (an empty value clears it)
    SetCell { row: RowId, col: ColumnId, value: String },
    /// Merge a style patch into each cell
    ApplyStyle { cells: Vec<(RowId, ColumnId)>, style: CellStyle },
    /// Remove all styling from each cell
    ClearStyle { cells: Vec<(RowId, ColumnId)> },
    /// Append a column named after the next free letter
    AddColumn,
    /// Insert a named column at a display index
    InsertColumn { at: usize, name: String },
    DeleteColumn(ColumnId),
    RenameColumn { col: ColumnId, name: String },
    SetColumnKind { col: ColumnId, kind: ColumnKind },
    AppendRow,
    /// Insert an empty row above or below a display index
    InsertRow { at: usize, placement: Placement },
    DeleteRow(RowId),
    /// Copy a row (values and styles) directly below itself
    DuplicateRow(RowId),
    SetRowHeader { row: RowId, is_header: bool },
    /// Reorder rows by one column's values
    Sort { col: ColumnId, direction: SortDirection },
    ResizeColumn { col: ColumnId, width: u32 },
    ResizeRow { row: RowId, height: u32 },
    ResizeAllColumns(u32),
    ResizeAllRows(u32),
    Merge(Merge),
    /// Remove the merge covering a cell
    Unmerge { row: usize, col: usize },
    /// Write a block at an anchor, growing the grid as needed
    Paste { anchor: CellRef, block: Vec<Vec<String>>, limits: PasteLimits },
    /// Multiple transactions applied together; all or nothing
    Batch(Vec<Transaction>),
}

impl Transaction {
    /// Produce the next snapshot. The input is left untouched, also on error.
    pub fn apply(&self, grid: &GridModel) -> Result<GridModel> {
        let mut next = grid.clone();
        self.apply_to(&mut next)?;
        Ok(next)
    }

    fn apply_to(&self, grid: &mut GridModel) -> Result<()> {
        match self {
            Transaction::SetCell { row, col, value } => {
                grid.set_cell_value(*row, *col, value.clone())?;
            }
            Transaction::ApplyStyle { cells, style } => {
                for (row, col) in cells {
                    grid.apply_style(*row, *col, style)?;
                }
            }
            Transaction::ClearStyle { cells } => {
                for (row, col) in cells {
                    grid.clear_style(*row, *col)?;
                }
            }
            Transaction::AddColumn => {
                grid.add_column();
            }
            Transaction::InsertColumn { at, name } => {
                grid.insert_column_at(*at, name.clone());
            }
            Transaction::DeleteColumn(col) => grid.delete_column(*col)?,
            Transaction::RenameColumn { col, name } => grid.rename_column(*col, name.clone())?,
            Transaction::SetColumnKind { col, kind } => grid.set_column_kind(*col, *kind)?,
            Transaction::AppendRow => {
                grid.append_row();
            }
            Transaction::InsertRow { at, placement } => {
                grid.insert_row(*at, *placement);
            }
            Transaction::DeleteRow(row) => grid.delete_row(*row)?,
            Transaction::DuplicateRow(row) => {
                grid.duplicate_row(*row)?;
            }
            Transaction::SetRowHeader { row, is_header } => grid.set_row_header(*row, *is_header)?,
            Transaction::Sort { col, direction } => grid.sort_by_column(*col, *direction)?,
            Transaction::ResizeColumn { col, width } => {
                grid.set_column_width(*col, *width)?;
            }
            Transaction::ResizeRow { row, height } => {
                grid.set_row_height(*row, *height)?;
            }
            Transaction::ResizeAllColumns(width) => {
                grid.set_all_column_widths(*width);
            }
            Transaction::ResizeAllRows(height) => {
                grid.set_all_row_heights(*height);
            }
            Transaction::Merge(merge) => grid.add_merge(*merge)?,
            Transaction::Unmerge { row, col } => {
                grid.remove_merge_at(*row, *col)?;
            }
            Transaction::Paste { anchor, block, limits } => {
                if block.iter().all(|r| r.is_empty()) {
                    return Err(GridError::EmptyPaste);
                }
                paste_block(grid, *anchor, block, *limits);
            }
            Transaction::Batch(txns) => {
                for txn in txns {
                    txn.apply_to(grid)?;
                }
            }
        }
        Ok(())
    }

    /// Short name for logging
    pub fn label(&self) -> &'static str {
        match self {
            Transaction::SetCell { .. } => "set cell",
            Transaction::ApplyStyle { .. } => "apply style",
            Transaction::ClearStyle { .. } => "clear style",
            Transaction::AddColumn => "add column",
            Transaction::InsertColumn { .. } => "insert column",
            Transaction::DeleteColumn(_) => "delete column",
            Transaction::RenameColumn { .. } => "rename column",
            Transaction::SetColumnKind { .. } => "set column kind",
            Transaction::AppendRow => "append row",
            Transaction::InsertRow { .. } => "insert row",
            Transaction::DeleteRow(_) => "delete row",
            Transaction::DuplicateRow(_) => "duplicate row",
            Transaction::SetRowHeader { .. } => "set row header",
            Transaction::Sort { .. } => "sort",
            Transaction::ResizeColumn { .. } => "resize column",
            Transaction::ResizeRow { .. } => "resize row",
            Transaction::ResizeAllColumns(_) => "resize all columns",
            Transaction::ResizeAllRows(_) => "resize all rows",
            Transaction::Merge(_) => "merge",
            Transaction::Unmerge { .. } => "unmerge",
            Transaction::Paste { .. } => "paste",
            Transaction::Batch(_) => "batch",
        }
    }
}
