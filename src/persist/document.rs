//! In-memory form of one stored spreadsheet, shared by the store implementations

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::store::{SheetData, SheetId, SheetInfo, SheetSnapshot, Spreadsheet};
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredSheet {
    pub info: SheetInfo,
    #[serde(default)]
    pub snapshot: SheetSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Document {
    pub spreadsheet: Spreadsheet,
    pub sheets: Vec<StoredSheet>,
}

impl Document {
    /// A new spreadsheet with one empty sheet
    pub fn new(name: &str, description: &str) -> Self {
        let mut doc = Self { spreadsheet: Spreadsheet::new(name, description), sheets: Vec::new() };
        doc.push_sheet("Sheet 1", SheetSnapshot::default());
        doc
    }

    fn push_sheet(&mut self, name: &str, snapshot: SheetSnapshot) -> SheetInfo {
        let info = SheetInfo {
            id: SheetId::new(),
            spreadsheet_id: self.spreadsheet.id,
            name: name.to_string(),
            order: self.sheets.len(),
        };
        self.sheets.push(StoredSheet { info: info.clone(), snapshot });
        self.touch();
        info
    }

    fn touch(&mut self) {
        self.spreadsheet.updated_at = Utc::now();
    }

    fn sheet(&self, id: SheetId) -> Result<&StoredSheet, StoreError> {
        self.sheets
            .iter()
            .find(|s| s.info.id == id)
            .ok_or_else(|| StoreError::SheetNotFound(id.to_string()))
    }

    fn sheet_mut(&mut self, id: SheetId) -> Result<&mut StoredSheet, StoreError> {
        self.sheets
            .iter_mut()
            .find(|s| s.info.id == id)
            .ok_or_else(|| StoreError::SheetNotFound(id.to_string()))
    }

    pub fn infos(&self) -> Vec<SheetInfo> {
        self.sheets.iter().map(|s| s.info.clone()).collect()
    }

    pub fn fetch(&self, sheet: Option<SheetId>) -> Result<SheetData, StoreError> {
        let stored = match sheet {
            Some(id) => self.sheet(id)?,
            None => self
                .sheets
                .first()
                .ok_or_else(|| StoreError::InvalidData(format!("spreadsheet {} has no sheets", self.spreadsheet.id)))?,
        };
        Ok(SheetData {
            sheets: self.infos(),
            active_sheet_id: stored.info.id,
            snapshot: stored.snapshot.clone(),
        })
    }

    pub fn save(&mut self, sheet: SheetId, snapshot: &SheetSnapshot) -> Result<(), StoreError> {
        self.sheet_mut(sheet)?.snapshot = snapshot.clone();
        self.touch();
        Ok(())
    }

    pub fn add_sheet(&mut self, name: &str) -> SheetInfo {
        self.push_sheet(name, SheetSnapshot::default())
    }

    pub fn rename_sheet(&mut self, sheet: SheetId, name: &str) -> Result<(), StoreError> {
        self.sheet_mut(sheet)?.info.name = name.to_string();
        self.touch();
        Ok(())
    }

    pub fn delete_sheet(&mut self, sheet: SheetId) -> Result<(), StoreError> {
        let idx = self
            .sheets
            .iter()
            .position(|s| s.info.id == sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        if self.sheets.len() == 1 {
            return Err(StoreError::InvalidData("cannot delete the last sheet".to_string()));
        }
        self.sheets.remove(idx);
        for (order, s) in self.sheets.iter_mut().enumerate() {
            s.info.order = order;
        }
        self.touch();
        Ok(())
    }

    pub fn duplicate_sheet(&mut self, sheet: SheetId) -> Result<SheetInfo, StoreError> {
        let source = self.sheet(sheet)?;
        let name = format!("{} (copy)", source.info.name);
        let snapshot = source.snapshot.with_fresh_ids();
        Ok(self.push_sheet(&name, snapshot))
    }
}
