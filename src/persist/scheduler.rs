use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::store::{SheetId, SheetSnapshot, SheetStore, SpreadsheetId};
use crate::error::StoreError;

/// Save indicator shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Idle => write!(f, ""),
            SaveStatus::Saving => write!(f, "Saving..."),
            SaveStatus::Saved => write!(f, "Saved"),
            SaveStatus::Error(e) => write!(f, "Save failed: {}", e),
        }
    }
}

/// Debounced save scheduling as a deadline state machine.
///
/// Nothing here sleeps: the host calls `tick(now)` from its event loop, and a flush starts
/// once the deadline has passed. `begin_flush` and `finish_flush` bracket a flush so a host
/// with an asynchronous store can keep the in-flight flag set across the await; `poll` does
/// both around a synchronous `SheetStore`.
#[derive(Debug)]
pub struct SaveScheduler {
    debounce: Duration,
    saved_display: Duration,
    deadline: Option<Instant>,
    dirty: bool,
    in_flight: bool,
    status: SaveStatus,
    saved_at: Option<Instant>,
}

impl SaveScheduler {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);
    pub const DEFAULT_SAVED_DISPLAY: Duration = Duration::from_millis(2000);

    pub fn new(debounce: Duration, saved_display: Duration) -> Self {
        Self {
            debounce,
            saved_display,
            deadline: None,
            dirty: false,
            in_flight: false,
            status: SaveStatus::Idle,
            saved_at: None,
        }
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// Changes exist that no flush has picked up yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A flush is waiting for its deadline
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record a change and restart the debounce window
    pub fn schedule(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now + self.debounce);
    }

    /// Record a change that should be flushed on the next tick
    pub fn save_now(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now);
    }

    /// Drop the pending deadline. Dirty state is kept.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            debug!("cancelled pending save");
        }
    }

    /// Advance time. Returns `true` when a flush should start now.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.status == SaveStatus::Saved
            && self.saved_at.is_some_and(|t| now.duration_since(t) >= self.saved_display)
        {
            self.status = SaveStatus::Idle;
            self.saved_at = None;
        }
        !self.in_flight && self.dirty && self.deadline.is_some_and(|d| now >= d)
    }

    /// Mark a flush as started. Returns `false` if one is already running or nothing is dirty.
    pub fn begin_flush(&mut self) -> bool {
        if self.in_flight || !self.dirty {
            return false;
        }
        self.in_flight = true;
        self.dirty = false;
        self.deadline = None;
        self.status = SaveStatus::Saving;
        true
    }

    /// Record a flush outcome. On failure the changes are dirty again but nothing is
    /// rescheduled: the next edit or an explicit save retries.
    pub fn finish_flush(&mut self, now: Instant, result: &Result<(), StoreError>) {
        self.in_flight = false;
        match result {
            Ok(()) => {
                self.status = SaveStatus::Saved;
                self.saved_at = Some(now);
            }
            Err(e) => {
                self.dirty = true;
                self.status = SaveStatus::Error(e.to_string());
                self.saved_at = None;
            }
        }
    }

    /// Tick and, if due, flush `snapshot` through a synchronous store.
    /// Returns the flush outcome when one ran.
    pub fn poll<S: SheetStore + ?Sized>(
        &mut self,
        now: Instant,
        store: &mut S,
        spreadsheet: SpreadsheetId,
        sheet: SheetId,
        snapshot: impl FnOnce() -> SheetSnapshot,
    ) -> Option<Result<(), StoreError>> {
        if !self.tick(now) {
            return None;
        }
        Some(self.flush(now, store, spreadsheet, sheet, snapshot()))
    }

    /// Flush immediately if anything is dirty, regardless of the deadline
    pub fn flush<S: SheetStore + ?Sized>(
        &mut self,
        now: Instant,
        store: &mut S,
        spreadsheet: SpreadsheetId,
        sheet: SheetId,
        snapshot: SheetSnapshot,
    ) -> Result<(), StoreError> {
        if !self.begin_flush() {
            return Ok(());
        }
        let result = store.save_sheet_data(spreadsheet, sheet, &snapshot);
        match &result {
            Ok(()) => info!(%sheet, cells = snapshot.cells.len(), "sheet saved"),
            Err(e) => warn!(%sheet, error = %e, "sheet save failed"),
        }
        self.finish_flush(now, &result);
        result
    }
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEBOUNCE, Self::DEFAULT_SAVED_DISPLAY)
    }
}
