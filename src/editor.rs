//! The editor: one sheet's live state wired to selection, clipboard, resizing and saving.
//!
//! Time only advances through [`Editor::tick`]. Edits schedule their save relative to the
//! most recent tick, the way a host event loop that polls every frame would see them.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::clipboard::{Clipboard, CopyOutcome, PastePlan};
use crate::config::EditorConfig;
use crate::error::{GridError, Result, StoreError};
use crate::formula;
use crate::grid::{CellStyle, ColumnId, ColumnKind, GridModel, Placement, RowId, SortDirection};
use crate::persist::{SaveScheduler, SaveStatus, SheetData, SheetId, SheetInfo, SheetSnapshot, SheetStore, SpreadsheetId};
use crate::resize::{ResizeController, ResizeTarget};
use crate::selection::Selection;
use crate::transaction::{GridState, Transaction};

pub struct Editor<S: SheetStore> {
    store: S,
    config: EditorConfig,
    spreadsheet: SpreadsheetId,
    sheet: SheetId,
    sheets: Vec<SheetInfo>,
    state: GridState,
    selection: Selection,
    resize: ResizeController,
    clipboard: Clipboard,
    scheduler: SaveScheduler,
    notice: Option<String>,
    now: Instant,
}

impl<S: SheetStore> Editor<S> {
    /// Load a sheet (the first one if `sheet` is `None`) from the store.
    ///
    /// A sheet without columns is seeded with a blank lettered grid, and that grid is
    /// scheduled for saving.
    pub fn open(store: S, spreadsheet: SpreadsheetId, sheet: Option<SheetId>, config: EditorConfig) -> Result<Self> {
        let data = store.fetch_sheet_data(spreadsheet, sheet).map_err(|e| {
            warn!(%spreadsheet, error = %e, "failed to load sheet");
            GridError::from(e)
        })?;

        let now = Instant::now();
        let mut editor = Self {
            state: GridState::new(GridModel::default(), config.undo_depth),
            scheduler: SaveScheduler::new(config.debounce(), config.saved_display()),
            sheet: data.active_sheet_id,
            sheets: Vec::new(),
            store,
            config,
            spreadsheet,
            selection: Selection::new(),
            resize: ResizeController::new(),
            clipboard: Clipboard::new(),
            notice: None,
            now,
        };
        editor.load(data);
        Ok(editor)
    }

    /// Use a different clipboard (for example one backed by the system clipboard)
    pub fn with_clipboard(mut self, clipboard: Clipboard) -> Self {
        self.clipboard = clipboard;
        self
    }

    fn load(&mut self, data: SheetData) {
        self.sheet = data.active_sheet_id;
        self.sheets = data.sheets;

        let seeded = data.snapshot.is_empty();
        let grid = if seeded {
            GridModel::seeded(self.config.limits, self.config.seed_columns, self.config.seed_rows)
        } else {
            data.snapshot.into_grid(self.config.limits)
        };
        info!(
            sheet = %self.sheet,
            rows = grid.row_count(),
            columns = grid.column_count(),
            seeded,
            "loaded sheet"
        );

        self.state.replace(grid);
        self.selection = Selection::new();
        self.resize = ResizeController::new();
        if seeded {
            self.scheduler.schedule(self.now);
        }
    }

    // === Accessors ===

    pub fn grid(&self) -> &GridModel {
        self.state.grid()
    }

    pub fn snapshot(&self) -> Arc<GridModel> {
        self.state.snapshot()
    }

    /// Bumped on every visible change
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn spreadsheet_id(&self) -> SpreadsheetId {
        self.spreadsheet
    }

    pub fn active_sheet(&self) -> SheetId {
        self.sheet
    }

    pub fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.scheduler.status()
    }

    pub fn is_dirty(&self) -> bool {
        self.scheduler.is_dirty()
    }

    pub fn is_save_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn can_undo(&self) -> bool {
        self.state.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.history().can_redo()
    }

    /// Message from the last rejected operation
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Value to show for the cell at (row, col); formulas are evaluated
    pub fn display_value(&self, row: usize, col: usize) -> String {
        formula::display_value(self.grid(), row, col)
    }

    // === Time and saving ===

    /// Advance time; flushes the active sheet when its save is due.
    /// Returns the outcome when a flush ran. An open resize drag is not saved.
    pub fn tick(&mut self, now: Instant) -> Option<std::result::Result<(), StoreError>> {
        self.now = now;
        let grid = self.state.committed();
        self.scheduler
            .poll(now, &mut self.store, self.spreadsheet, self.sheet, || SheetSnapshot::from_grid(grid))
    }

    /// Flush pending changes immediately
    pub fn save_now(&mut self) -> Result<()> {
        let snapshot = SheetSnapshot::from_grid(self.state.committed());
        self.scheduler
            .flush(self.now, &mut self.store, self.spreadsheet, self.sheet, snapshot)
            .map_err(GridError::from)
    }

    /// Tear down: the pending save timer is cancelled, and unsaved changes are reported
    pub fn unmount(mut self) -> S {
        self.scheduler.cancel();
        if self.scheduler.is_dirty() {
            warn!(sheet = %self.sheet, "editor closed with unsaved changes");
        }
        self.store
    }

    // === Dispatch ===

    fn reject(&mut self, err: GridError) -> GridError {
        warn!(error = %err, "operation rejected");
        self.notice = Some(err.to_string());
        err
    }

    /// Apply a transaction; a change schedules exactly one save.
    /// An open resize drag is committed first.
    fn apply(&mut self, txn: Transaction) -> Result<()> {
        if self.state.commit_gesture() {
            self.scheduler.schedule(self.now);
        }
        match self.state.dispatch(&txn) {
            Ok(changed) => {
                if changed {
                    self.scheduler.schedule(self.now);
                    self.selection.clamp(self.state.grid());
                }
                Ok(())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    fn row_id(&mut self, idx: usize) -> Result<RowId> {
        let id = self.grid().row_at(idx).map(|r| r.id);
        match id {
            Some(id) => Ok(id),
            None => Err(self.reject(GridError::RowOutOfRange(idx))),
        }
    }

    fn column_id(&mut self, idx: usize) -> Result<ColumnId> {
        let id = self.grid().column_at(idx).map(|c| c.id);
        match id {
            Some(id) => Ok(id),
            None => Err(self.reject(GridError::ColumnOutOfRange(idx))),
        }
    }

    // === Selection ===

    pub fn pointer_down(&mut self, row: usize, col: usize) {
        self.selection.pointer_down(row, col);
    }

    pub fn pointer_enter(&mut self, row: usize, col: usize) {
        self.selection.pointer_enter(row, col);
    }

    pub fn pointer_up(&mut self) {
        self.selection.pointer_up();
    }

    pub fn select(&mut self, row: usize, col: usize) {
        self.selection.collapse_to(row, col);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(self.state.grid());
    }

    // === Cells ===

    /// Set a raw value. Writing inside a merge writes to the merge's anchor cell.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let (row, col) = self.grid().owner_of(row, col);
        let row = self.row_id(row)?;
        let col = self.column_id(col)?;
        self.apply(Transaction::SetCell { row, col, value: value.into() })
    }

    /// Empty every selected cell's value; styles stay
    pub fn clear_selection(&mut self) -> Result<()> {
        let txns = self
            .selection
            .cell_ids(self.grid())
            .into_iter()
            .map(|(row, col)| Transaction::SetCell { row, col, value: String::new() })
            .collect();
        self.apply(Transaction::Batch(txns))
    }

    pub fn apply_style(&mut self, style: CellStyle) -> Result<()> {
        let cells = self.selection.cell_ids(self.grid());
        self.apply(Transaction::ApplyStyle { cells, style })
    }

    pub fn clear_style(&mut self) -> Result<()> {
        let cells = self.selection.cell_ids(self.grid());
        self.apply(Transaction::ClearStyle { cells })
    }

    // === Columns ===

    pub fn add_column(&mut self) -> Result<()> {
        self.apply(Transaction::AddColumn)
    }

    pub fn insert_column(&mut self, at: usize, name: impl Into<String>) -> Result<()> {
        self.apply(Transaction::InsertColumn { at, name: name.into() })
    }

    pub fn delete_column(&mut self, idx: usize) -> Result<()> {
        let col = self.column_id(idx)?;
        self.apply(Transaction::DeleteColumn(col))
    }

    pub fn rename_column(&mut self, idx: usize, name: impl Into<String>) -> Result<()> {
        let col = self.column_id(idx)?;
        self.apply(Transaction::RenameColumn { col, name: name.into() })
    }

    pub fn set_column_kind(&mut self, idx: usize, kind: ColumnKind) -> Result<()> {
        let col = self.column_id(idx)?;
        self.apply(Transaction::SetColumnKind { col, kind })
    }

    pub fn sort_by_column(&mut self, idx: usize, direction: SortDirection) -> Result<()> {
        let col = self.column_id(idx)?;
        self.apply(Transaction::Sort { col, direction })
    }

    // === Rows ===

    pub fn append_row(&mut self) -> Result<()> {
        self.apply(Transaction::AppendRow)
    }

    pub fn insert_row(&mut self, at: usize, placement: Placement) -> Result<()> {
        self.apply(Transaction::InsertRow { at, placement })
    }

    pub fn delete_row(&mut self, idx: usize) -> Result<()> {
        let row = self.row_id(idx)?;
        self.apply(Transaction::DeleteRow(row))
    }

    pub fn duplicate_row(&mut self, idx: usize) -> Result<()> {
        let row = self.row_id(idx)?;
        self.apply(Transaction::DuplicateRow(row))
    }

    pub fn set_row_header(&mut self, idx: usize, is_header: bool) -> Result<()> {
        let row = self.row_id(idx)?;
        self.apply(Transaction::SetRowHeader { row, is_header })
    }

    // === Merges ===

    pub fn merge_selection(&mut self) -> Result<()> {
        let merge = self.selection.to_merge();
        self.apply(Transaction::Merge(merge))?;
        let anchor = self.selection.top_left();
        self.selection.collapse_to(anchor.row, anchor.col);
        Ok(())
    }

    /// Remove the merge containing the selection's anchor cell
    pub fn unmerge_selection(&mut self) -> Result<()> {
        let anchor = self.selection.anchor();
        self.apply(Transaction::Unmerge { row: anchor.row, col: anchor.col })
    }

    // === Clipboard ===

    pub fn copy(&mut self) -> CopyOutcome {
        let block = self.selection.values(self.grid());
        self.clipboard.copy(block)
    }

    /// Paste at the selection's top-left cell, growing the grid as needed.
    /// The pasted area becomes the selection.
    pub fn paste(&mut self) -> Result<PastePlan> {
        let block = match self.clipboard.read() {
            Ok(block) => block,
            Err(e) => return Err(self.reject(e)),
        };
        let anchor = self.selection.top_left();
        let limits = self.config.paste;
        let plan = PastePlan::new(self.grid(), anchor, &block, limits);
        let rows = block.len();
        let cols = block.iter().map(|r| r.len()).max().unwrap_or(0);

        self.apply(Transaction::Paste { anchor, block, limits })?;
        if plan.cells_dropped > 0 {
            warn!(dropped = plan.cells_dropped, "paste exceeded growth limits");
            self.notice = Some(format!("{} pasted cells did not fit and were dropped", plan.cells_dropped));
        }
        debug!(rows, cols, rows_added = plan.rows_added, cols_added = plan.cols_added, "pasted block");

        self.selection.collapse_to(anchor.row, anchor.col);
        self.selection.pointer_down(anchor.row, anchor.col);
        self.selection.pointer_enter(anchor.row + rows.saturating_sub(1), anchor.col + cols.saturating_sub(1));
        self.selection.pointer_up();
        self.selection.clamp(self.state.grid());
        Ok(plan)
    }

    // === Resizing ===

    pub fn begin_column_resize(&mut self, idx: usize, pointer: i32) -> Result<()> {
        let col = self.column_id(idx)?;
        let width = self.grid().column_at(idx).map(|c| c.width).unwrap_or_default();
        self.resize.begin(ResizeTarget::Column(col), pointer, width);
        Ok(())
    }

    pub fn begin_row_resize(&mut self, idx: usize, pointer: i32) -> Result<()> {
        let row = self.row_id(idx)?;
        let height = self.grid().row_at(idx).map(|r| r.height).unwrap_or_default();
        self.resize.begin(ResizeTarget::Row(row), pointer, height);
        Ok(())
    }

    /// Live-update the size under drag. Not recorded or saved until `end_resize`.
    pub fn drag_resize(&mut self, pointer: i32) -> Result<u32> {
        let limits = self.config.limits;
        let txn = self.resize.drag(pointer, &limits)?;
        let size = match &txn {
            Transaction::ResizeColumn { width, .. } => *width,
            Transaction::ResizeRow { height, .. } => *height,
            _ => 0,
        };
        self.state.preview(&txn)?;
        Ok(size)
    }

    /// Commit the drag as one edit and schedule one save
    pub fn end_resize(&mut self) -> Result<u32> {
        let (_, size) = self.resize.end()?;
        if self.state.commit_gesture() {
            self.scheduler.schedule(self.now);
        }
        Ok(size)
    }

    pub fn cancel_resize(&mut self) {
        self.resize.cancel();
        self.state.cancel_gesture();
    }

    pub fn set_all_column_widths(&mut self, width: u32) -> Result<()> {
        self.apply(Transaction::ResizeAllColumns(width))
    }

    pub fn set_all_row_heights(&mut self, height: u32) -> Result<()> {
        self.apply(Transaction::ResizeAllRows(height))
    }

    // === History ===

    pub fn undo(&mut self) -> Result<()> {
        self.resize.cancel();
        if let Err(e) = self.state.undo() {
            return Err(self.reject(e));
        }
        self.scheduler.schedule(self.now);
        self.selection.clamp(self.state.grid());
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.resize.cancel();
        if let Err(e) = self.state.redo() {
            return Err(self.reject(e));
        }
        self.scheduler.schedule(self.now);
        self.selection.clamp(self.state.grid());
        Ok(())
    }

    // === Sheets ===

    fn store_call<T>(&mut self, result: std::result::Result<T, StoreError>) -> Result<T> {
        result.map_err(|e| self.reject(GridError::from(e)))
    }

    fn refresh_sheets(&mut self) -> Result<()> {
        let result = self.store.fetch_sheet_data(self.spreadsheet, Some(self.sheet));
        let data = self.store_call(result)?;
        self.sheets = data.sheets;
        Ok(())
    }

    fn flush_if_dirty(&mut self) -> Result<()> {
        if self.scheduler.is_dirty() {
            if let Err(e) = self.save_now() {
                return Err(self.reject(e));
            }
        }
        Ok(())
    }

    /// Make another sheet active. The departing sheet's unsaved changes are flushed
    /// first; its pending timer is then cancelled.
    pub fn switch_sheet(&mut self, sheet: SheetId) -> Result<()> {
        if sheet == self.sheet {
            return Ok(());
        }
        if !self.sheets.iter().any(|s| s.id == sheet) {
            return Err(self.reject(GridError::UnknownSheet(sheet)));
        }
        self.flush_if_dirty()?;
        self.scheduler.cancel();

        let result = self.store.fetch_sheet_data(self.spreadsheet, Some(sheet));
        let data = self.store_call(result)?;
        info!(from = %self.sheet, to = %sheet, "switching sheet");
        self.load(data);
        Ok(())
    }

    pub fn add_sheet(&mut self, name: &str) -> Result<SheetInfo> {
        let result = self.store.add_sheet(self.spreadsheet, name);
        let info = self.store_call(result)?;
        self.sheets.push(info.clone());
        Ok(info)
    }

    pub fn rename_sheet(&mut self, sheet: SheetId, name: &str) -> Result<()> {
        let result = self.store.rename_sheet(self.spreadsheet, sheet, name);
        self.store_call(result)?;
        if let Some(info) = self.sheets.iter_mut().find(|s| s.id == sheet) {
            info.name = name.to_string();
        }
        Ok(())
    }

    /// Delete a sheet. Deleting the active sheet switches to a neighbour first.
    pub fn delete_sheet(&mut self, sheet: SheetId) -> Result<()> {
        if self.sheets.len() <= 1 {
            return Err(self.reject(GridError::LastSheet));
        }
        let Some(idx) = self.sheets.iter().position(|s| s.id == sheet) else {
            return Err(self.reject(GridError::UnknownSheet(sheet)));
        };
        if sheet == self.sheet {
            let neighbour = if idx == 0 { self.sheets[1].id } else { self.sheets[idx - 1].id };
            self.switch_sheet(neighbour)?;
        }
        let result = self.store.delete_sheet(self.spreadsheet, sheet);
        self.store_call(result)?;
        self.refresh_sheets()
    }

    /// Copy a sheet. Unsaved changes on the active sheet are flushed first so the copy
    /// includes them.
    pub fn duplicate_sheet(&mut self, sheet: SheetId) -> Result<SheetInfo> {
        if sheet == self.sheet {
            self.flush_if_dirty()?;
        }
        let result = self.store.duplicate_sheet(self.spreadsheet, sheet);
        let info = self.store_call(result)?;
        self.sheets.push(info.clone());
        Ok(info)
    }
}
