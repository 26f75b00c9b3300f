use std::collections::VecDeque;
use std::sync::Arc;

use crate::grid::GridModel;

/// Undo/redo over whole snapshots. Snapshots share structure through `Arc`, so keeping
/// one costs a pointer until the next edit clones it.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Arc<GridModel>>,
    redo_stack: Vec<Arc<GridModel>>,
    max_depth: usize,
}

impl History {
    pub const DEFAULT_DEPTH: usize = 100;

    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Record the snapshot an edit replaced (clears redo stack). The oldest entry is
    /// dropped once the depth limit is reached.
    pub fn record(&mut self, previous: Arc<GridModel>) {
        if self.max_depth == 0 {
            return;
        }
        if self.undo_stack.len() == self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(previous);
        self.redo_stack.clear();
    }

    /// Step back from `current`, returning the snapshot to restore
    pub fn undo(&mut self, current: Arc<GridModel>) -> Option<Arc<GridModel>> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward from `current`, returning the snapshot to restore
    pub fn redo(&mut self, current: Arc<GridModel>) -> Option<Arc<GridModel>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}
