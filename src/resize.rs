//! Drag-to-resize for columns and rows.
//!
//! The controller only tracks the gesture. Each `drag` yields a resize transaction for the
//! host to preview; `end` tells the host to commit the gesture as a single edit.

use crate::error::{GridError, Result};
use crate::grid::{ColumnId, RowId, SizeLimits};
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    Column(ColumnId),
    Row(RowId),
}

#[derive(Debug, Clone, Copy)]
struct ActiveResize {
    target: ResizeTarget,
    start_pointer: i32,
    start_size: u32,
    size: u32,
}

#[derive(Debug, Default)]
pub struct ResizeController {
    active: Option<ActiveResize>,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<ResizeTarget> {
        self.active.map(|a| a.target)
    }

    /// Start a drag on a border at pointer position `pointer` (pixels along the drag axis)
    pub fn begin(&mut self, target: ResizeTarget, pointer: i32, start_size: u32) {
        self.active = Some(ActiveResize { target, start_pointer: pointer, start_size, size: start_size });
    }

    /// New size for the current pointer position: start size plus travel, floored
    pub fn drag(&mut self, pointer: i32, limits: &SizeLimits) -> Result<Transaction> {
        let active = self.active.as_mut().ok_or(GridError::NoResize)?;
        let delta = i64::from(pointer) - i64::from(active.start_pointer);
        let raw = (i64::from(active.start_size) + delta).clamp(0, i64::from(u32::MAX)) as u32;

        let txn = match active.target {
            ResizeTarget::Column(col) => {
                active.size = limits.clamp_width(raw);
                Transaction::ResizeColumn { col, width: active.size }
            }
            ResizeTarget::Row(row) => {
                active.size = limits.clamp_height(raw);
                Transaction::ResizeRow { row, height: active.size }
            }
        };
        Ok(txn)
    }

    /// Finish the drag, returning the target and its final size
    pub fn end(&mut self) -> Result<(ResizeTarget, u32)> {
        let active = self.active.take().ok_or(GridError::NoResize)?;
        Ok((active.target, active.size))
    }

    /// Abandon the drag, returning the target and the size to restore
    pub fn cancel(&mut self) -> Option<(ResizeTarget, u32)> {
        self.active.take().map(|a| (a.target, a.start_size))
    }
}
