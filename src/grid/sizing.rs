//! Column width / row height bounds and the sizing operations on `GridModel`

use serde::{Deserialize, Serialize};

use super::model::{ColumnId, GridModel, RowId};
use crate::error::{GridError, Result};

/// Pixel floors and defaults for column widths and row heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub min_column_width: u32,
    pub min_row_height: u32,
    pub default_column_width: u32,
    pub default_row_height: u32,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            min_column_width: 50,
            min_row_height: 20,
            default_column_width: 120,
            default_row_height: 32,
        }
    }
}

impl SizeLimits {
    #[inline]
    pub fn clamp_width(&self, width: u32) -> u32 {
        width.max(self.min_column_width)
    }

    #[inline]
    pub fn clamp_height(&self, height: u32) -> u32 {
        height.max(self.min_row_height)
    }
}

impl GridModel {
    /// Set one column's width (floored). Returns the width actually applied.
    pub fn set_column_width(&mut self, id: ColumnId, width: u32) -> Result<u32> {
        let width = self.limits().clamp_width(width);
        let column = self.column_mut(id).ok_or(GridError::UnknownColumn(id))?;
        column.width = width;
        Ok(width)
    }

    /// Set one row's height (floored). Returns the height actually applied.
    pub fn set_row_height(&mut self, id: RowId, height: u32) -> Result<u32> {
        let height = self.limits().clamp_height(height);
        let row = self.row_mut(id).ok_or(GridError::UnknownRow(id))?;
        row.height = height;
        Ok(height)
    }

    /// Apply one width to every column
    pub fn set_all_column_widths(&mut self, width: u32) -> u32 {
        let width = self.limits().clamp_width(width);
        for column in self.columns_mut() {
            column.width = width;
        }
        width
    }

    /// Apply one height to every row
    pub fn set_all_row_heights(&mut self, height: u32) -> u32 {
        let height = self.limits().clamp_height(height);
        for row in self.rows_mut() {
            row.height = height;
        }
        height
    }
}
