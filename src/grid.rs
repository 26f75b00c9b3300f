//! In-memory model of one sheet: columns, rows, cells, styles and merged regions.

mod merge;
mod model;
mod sizing;
mod sort;
mod style;

pub use merge::Merge;
pub use model::{Cell, CellId, Column, ColumnId, ColumnKind, GridModel, Placement, Row, RowId};
pub use sizing::SizeLimits;
pub use sort::{compare_values, SortDirection};
pub use style::{CellStyle, HorizontalAlign};
