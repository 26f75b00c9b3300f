use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::document::Document;
use super::store::{SheetData, SheetId, SheetInfo, SheetSnapshot, SheetStore, Spreadsheet, SpreadsheetId};
use crate::error::StoreError;

/// Directory of JSON documents, one `<spreadsheet id>.json` per spreadsheet.
///
/// Writes go to a temporary file in the same directory which is then renamed over the
/// target, so a reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: SpreadsheetId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn read(&self, id: SpreadsheetId) -> Result<Document, StoreError> {
        let path = self.path_for(id);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::SpreadsheetNotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn write(&self, doc: &Document) -> Result<(), StoreError> {
        let path = self.path_for(doc.spreadsheet.id);
        let tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, doc)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error.to_string()))?;
        debug!(path = %path.display(), "wrote spreadsheet document");
        Ok(())
    }

    /// Read, change and write back one document
    fn update<T>(
        &mut self,
        id: SpreadsheetId,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut doc = self.read(id)?;
        let out = f(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }
}

impl SheetStore for JsonFileStore {
    fn create_spreadsheet(&mut self, name: &str, description: &str) -> Result<Spreadsheet, StoreError> {
        let doc = Document::new(name, description);
        self.write(&doc)?;
        Ok(doc.spreadsheet)
    }

    fn delete_spreadsheet(&mut self, spreadsheet: SpreadsheetId) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(spreadsheet)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::SpreadsheetNotFound(spreadsheet.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_spreadsheets(&self) -> Result<Vec<Spreadsheet>, StoreError> {
        let mut list = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).and_then(|s| s.parse().ok()) else {
                continue;
            };
            match self.read(id) {
                Ok(doc) => list.push(doc.spreadsheet),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable spreadsheet"),
            }
        }
        list.sort_by_key(|s| s.created_at);
        Ok(list)
    }

    fn fetch_sheet_data(&self, spreadsheet: SpreadsheetId, sheet: Option<SheetId>) -> Result<SheetData, StoreError> {
        self.read(spreadsheet)?.fetch(sheet)
    }

    fn save_sheet_data(
        &mut self,
        spreadsheet: SpreadsheetId,
        sheet: SheetId,
        snapshot: &SheetSnapshot,
    ) -> Result<(), StoreError> {
        self.update(spreadsheet, |doc| doc.save(sheet, snapshot))
    }

    fn add_sheet(&mut self, spreadsheet: SpreadsheetId, name: &str) -> Result<SheetInfo, StoreError> {
        self.update(spreadsheet, |doc| Ok(doc.add_sheet(name)))
    }

    fn rename_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId, name: &str) -> Result<(), StoreError> {
        self.update(spreadsheet, |doc| doc.rename_sheet(sheet, name))
    }

    fn delete_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId) -> Result<(), StoreError> {
        self.update(spreadsheet, |doc| doc.delete_sheet(sheet))
    }

    fn duplicate_sheet(&mut self, spreadsheet: SpreadsheetId, sheet: SheetId) -> Result<SheetInfo, StoreError> {
        self.update(spreadsheet, |doc| doc.duplicate_sheet(sheet))
    }
}
