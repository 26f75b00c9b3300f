use std::collections::HashMap;

use tracing::debug;

use super::document::Document;
use super::store::{SheetData, SheetId, SheetInfo, SheetSnapshot, SheetStore, Spreadsheet, SpreadsheetId};
use crate::error::StoreError;

/// In-process store.
///
/// Used by tests and by hosts that persist elsewhere. Failures can be injected to
/// exercise error paths: while offline every call fails with `Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<SpreadsheetId, Document>,
    offline: bool,
    fail_saves: bool,
    save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail until switched back
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Make saves fail while reads keep working
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    fn doc(&self, id: SpreadsheetId) -> Result<&Document, StoreError> {
        self.check_online()?;
        self.docs.get(&id).ok_or_else(|| StoreError::SpreadsheetNotFound(id.to_string()))
    }

    fn doc_mut(&mut self, id: SpreadsheetId) -> Result<&mut Document, StoreError> {
        self.check_online()?;
        self.docs.get_mut(&id).ok_or_else(|| StoreError::SpreadsheetNotFound(id.to_string()))
    }
}

impl SheetStore for MemoryStore {
    fn create_spreadsheet(&mut self, name: &str, description: &str) -> Result<Spreadsheet, StoreError> {
        self.check_online()?;
        let doc = Document::new(name, description);
        let spreadsheet = doc.spreadsheet.clone();
        self.docs.insert(spreadsheet.id, doc);
        Ok(spreadsheet)
    }

    fn delete_spreadsheet(&mut self, spreadsheet: SpreadsheetId) -> Result<(), StoreError> {
        self.check_online()?;
        self.docs
            .remove(&spreadsheet)
            .map(|_| ())
            .ok_or_else(|| StoreError::SpreadsheetNotFound(spreadsheet.to_string()))
    }

    fn list_spreadsheets(&self) -> Result<Vec<Spreadsheet>, StoreError> {
        self.check_online()?;
        let mut list: Vec<Spreadsheet> = self.docs.values().map(|d| d.spreadsheet.clone()).collect();
        list.sort_by_key(|s| s.created_at);
        Ok(list)
    }

    fn fetch_sheet_data(&self, spreadsheet: SpreadsheetId, sheet: Option<SheetId>) -> Result<SheetData, StoreError> {
        self.doc(spreadsheet)?.fetch(sheet)
    }

    fn save_sheet_data(
        &mut self,
        spreadsheet: SpreadsheetId,
        sheet: SheetId,
        snapshot: &SheetSnapshot,
    ) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("save rejected".to_string()));
        }
        self.doc_mut(spreadsheet)?.save(sheet, snapshot)?;
        self.save_count += 1;
        debug!(%spreadsheet, %sheet, cells = snapshot.cells.len(), "saved sheet snapshot");
        Ok(())
    }

    fn add_sheet(&mut self, spreadsheet: SpreadsheetId, name: &str) -> Result<SheetInfo, StoreError> {
        Ok(self.doc_mut(spreadsheet)?.add_sheet(name))
    }

    fn rename_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId, name: &str) -> Result<(), StoreError> {
        self.doc_mut(spreadsheet)?.rename_sheet(sheet, name)
    }

    fn delete_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId) -> Result<(), StoreError> {
        self.doc_mut(spreadsheet)?.delete_sheet(sheet)
    }

    fn duplicate_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId) -> Result<SheetInfo, StoreError> {
        self.doc_mut(spreadsheet)?.duplicate_sheet(sheet)
    }
}
