use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::grid::{Cell, CellId, Column, ColumnId, GridModel, Merge, Row, RowId, SizeLimits};
use crate::util::define_id;

define_id!(SpreadsheetId);
define_id!(SheetId);

/// A workbook: owns one or more sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub id: SpreadsheetId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Spreadsheet {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SpreadsheetId::new(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub id: SheetId,
    pub spreadsheet_id: SpreadsheetId,
    pub name: String,
    pub order: usize,
}

/// A stored cell bound to its row and column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub row_id: RowId,
    pub column_id: ColumnId,
    #[serde(flatten)]
    pub cell: Cell,
}

/// Everything persisted for one sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSnapshot {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub merges: Vec<Merge>,
    pub cells: Vec<CellRecord>,
}

impl SheetSnapshot {
    /// Snapshot of a grid; only cells carrying a value or a style are included
    pub fn from_grid(grid: &GridModel) -> Self {
        Self {
            columns: grid.columns().to_vec(),
            rows: grid.rows().to_vec(),
            merges: grid.merges().to_vec(),
            cells: grid
                .cells()
                .into_iter()
                .filter(|(_, _, cell)| !cell.is_blank())
                .map(|(row_id, column_id, cell)| CellRecord { row_id, column_id, cell: cell.clone() })
                .collect(),
        }
    }

    pub fn into_grid(self, limits: SizeLimits) -> GridModel {
        GridModel::from_parts(
            limits,
            self.columns,
            self.rows,
            self.cells.into_iter().map(|r| (r.row_id, r.column_id, r.cell)),
            self.merges,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Copy with new row, column and cell identities, for duplicating a sheet
    pub fn with_fresh_ids(&self) -> Self {
        use std::collections::HashMap;

        let col_map: HashMap<ColumnId, ColumnId> = self.columns.iter().map(|c| (c.id, ColumnId::new())).collect();
        let row_map: HashMap<RowId, RowId> = self.rows.iter().map(|r| (r.id, RowId::new())).collect();

        Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column { id: col_map[&c.id], ..c.clone() })
                .collect(),
            rows: self.rows.iter().map(|r| Row { id: row_map[&r.id], ..r.clone() }).collect(),
            merges: self.merges.clone(),
            cells: self
                .cells
                .iter()
                .filter_map(|rec| {
                    Some(CellRecord {
                        row_id: *row_map.get(&rec.row_id)?,
                        column_id: *col_map.get(&rec.column_id)?,
                        cell: Cell { id: CellId::new(), ..rec.cell.clone() },
                    })
                })
                .collect(),
        }
    }
}

/// What a fetch returns: the workbook's sheet list, which sheet was loaded, and its contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    pub sheets: Vec<SheetInfo>,
    pub active_sheet_id: SheetId,
    #[serde(flatten)]
    pub snapshot: SheetSnapshot,
}

/// The persistence boundary.
///
/// `save_sheet_data` replaces the sheet's stored columns, rows, merges and cells with the
/// snapshot as one unit: a failed save leaves the previous snapshot intact.
pub trait SheetStore {
    fn create_spreadsheet(&mut self, name: &str, description: &str) -> Result<Spreadsheet, StoreError>;

    /// Remove a spreadsheet and all of its sheets
    fn delete_spreadsheet(&mut self, spreadsheet: SpreadsheetId) -> Result<(), StoreError>;

    fn list_spreadsheets(&self) -> Result<Vec<Spreadsheet>, StoreError>;

    /// Load one sheet, or the first sheet when `sheet` is `None`
    fn fetch_sheet_data(&self, spreadsheet: SpreadsheetId, sheet: Option<SheetId>) -> Result<SheetData, StoreError>;

    fn save_sheet_data(
        &mut self,
        spreadsheet: SpreadsheetId,
        sheet: SheetId,
        snapshot: &SheetSnapshot,
    ) -> Result<(), StoreError>;

    fn add_sheet(&mut self, spreadsheet: SpreadsheetId, name: &str) -> Result<SheetInfo, StoreError>;

    fn rename_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId, name: &str) -> Result<(), StoreError>;

    fn delete_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId) -> Result<(), StoreError>;

    /// Copy a sheet's contents into a new sheet placed after the existing ones
    fn duplicate_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId) -> Result<SheetInfo, StoreError>;
}
