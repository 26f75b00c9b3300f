use std::sync::Arc;

use tracing::debug;

use super::history::History;
use super::transaction::Transaction;
use crate::error::{GridError, Result};
use crate::grid::GridModel;

/// Versioned holder of the current sheet snapshot.
///
/// Every accepted change swaps in a new snapshot and bumps the version; readers holding an
/// older `Arc` keep a consistent view. A transaction that leaves the grid unchanged is not
/// recorded and does not bump the version.
///
/// Gestures (a resize drag) preview transactions against the snapshot taken when the gesture
/// started, then either commit as one undo step or roll back.
#[derive(Debug)]
pub struct GridState {
    current: Arc<GridModel>,
    version: u64,
    history: History,
    gesture_base: Option<Arc<GridModel>>,
}

impl GridState {
    pub fn new(grid: GridModel, undo_depth: usize) -> Self {
        Self {
            current: Arc::new(grid),
            version: 0,
            history: History::new(undo_depth),
            gesture_base: None,
        }
    }

    pub fn grid(&self) -> &GridModel {
        &self.current
    }

    /// Shared handle to the current snapshot
    pub fn snapshot(&self) -> Arc<GridModel> {
        Arc::clone(&self.current)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The grid without any open gesture's preview applied
    pub fn committed(&self) -> &GridModel {
        self.gesture_base.as_deref().unwrap_or(self.current.as_ref())
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture_base.is_some()
    }

    /// Apply a transaction. Returns whether the grid changed.
    pub fn dispatch(&mut self, txn: &Transaction) -> Result<bool> {
        if self.gesture_base.is_some() {
            self.commit_gesture();
        }
        let next = txn.apply(&self.current)?;
        if next == *self.current {
            debug!(txn = txn.label(), "transaction left grid unchanged");
            return Ok(false);
        }
        let previous = std::mem::replace(&mut self.current, Arc::new(next));
        self.history.record(previous);
        self.version += 1;
        debug!(txn = txn.label(), version = self.version, "applied transaction");
        Ok(true)
    }

    /// Show the effect of a transaction relative to the gesture's starting snapshot
    pub fn preview(&mut self, txn: &Transaction) -> Result<()> {
        let base = Arc::clone(self.gesture_base.get_or_insert_with(|| Arc::clone(&self.current)));
        let next = txn.apply(&base)?;
        if next != *self.current {
            self.current = Arc::new(next);
            self.version += 1;
        }
        Ok(())
    }

    /// End a gesture, recording it as one undo step. Returns whether the grid changed.
    pub fn commit_gesture(&mut self) -> bool {
        let Some(base) = self.gesture_base.take() else {
            return false;
        };
        if *base == *self.current {
            return false;
        }
        self.history.record(base);
        true
    }

    /// End a gesture, restoring its starting snapshot
    pub fn cancel_gesture(&mut self) {
        if let Some(base) = self.gesture_base.take() {
            if *base != *self.current {
                self.current = base;
                self.version += 1;
            }
        }
    }

    pub fn undo(&mut self) -> Result<()> {
        self.cancel_gesture();
        let current = Arc::clone(&self.current);
        let previous = self.history.undo(current).ok_or(GridError::NothingToUndo)?;
        self.current = previous;
        self.version += 1;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.cancel_gesture();
        let current = Arc::clone(&self.current);
        let next = self.history.redo(current).ok_or(GridError::NothingToRedo)?;
        self.current = next;
        self.version += 1;
        Ok(())
    }

    /// Swap in an unrelated grid (another sheet), discarding history
    pub fn replace(&mut self, grid: GridModel) {
        self.gesture_base = None;
        self.history.clear();
        self.current = Arc::new(grid);
        self.version += 1;
    }
}
