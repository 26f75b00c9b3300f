//! Persistence: the store contract, two store implementations and the debounced save
//! scheduler.
//!
//! Every save writes a full snapshot of one sheet (columns, rows, merges, non-empty cells)
//! and replaces whatever the store held for it.

mod document;
pub mod file;
pub mod memory;
pub mod scheduler;
pub mod store;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use scheduler::{SaveScheduler, SaveStatus};
pub use store::{CellRecord, SheetData, SheetId, SheetInfo, SheetSnapshot, SheetStore, Spreadsheet, SpreadsheetId};
