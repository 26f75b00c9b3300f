//! Error types for the grid engine

use thiserror::Error;

use crate::grid::{ColumnId, RowId};
use crate::persist::SheetId;

/// Rejections of structural operations on a sheet.
///
/// None of these mutate state: the operation is refused before anything changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Cannot delete the last column")]
    LastColumn,

    #[error("Cannot delete the last row")]
    LastRow,

    #[error("Cannot delete the last sheet")]
    LastSheet,

    #[error("Select more than one cell to merge")]
    SingleCellMerge,

    #[error("Selection overlaps an existing merge; unmerge it first")]
    OverlappingMerge,

    #[error("Selection is not part of a merged region")]
    NotMerged,

    #[error("Merge bounds are outside the grid")]
    MergeOutOfBounds,

    #[error("Unknown column: {0}")]
    UnknownColumn(ColumnId),

    #[error("Unknown row: {0}")]
    UnknownRow(RowId),

    #[error("Row {0} is outside the grid")]
    RowOutOfRange(usize),

    #[error("Column {0} is outside the grid")]
    ColumnOutOfRange(usize),

    #[error("Unknown sheet: {0}")]
    UnknownSheet(SheetId),

    #[error("Nothing to paste")]
    EmptyPaste,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No resize in progress")]
    NoResize,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures reported by a `SheetStore` implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid store data: {0}")]
    InvalidData(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
