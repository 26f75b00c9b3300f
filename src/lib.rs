//! Embeddable spreadsheet engine: a multi-sheet grid with range formulas, merged cells,
//! clipboard interchange and debounced full-snapshot persistence.

pub mod util;

pub mod clipboard;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod formula;
pub mod grid;
pub mod persist;
pub mod resize;
pub mod selection;
pub mod transaction;

pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{GridError, Result, StoreError};
pub use grid::GridModel;
pub use persist::{JsonFileStore, MemoryStore, SheetStore};
