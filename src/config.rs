use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clipboard::PasteLimits;
use crate::grid::SizeLimits;
use crate::transaction::History;

/// Editor settings. Every field has a default, so a config file only lists what it changes:
///
/// ```toml
/// debounce_ms = 800
///
/// [limits]
/// min_column_width = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last edit before a save starts
    pub debounce_ms: u64,
    /// How long "Saved" stays up before the status returns to idle
    pub saved_display_ms: u64,
    pub limits: SizeLimits,
    pub paste: PasteLimits,
    /// Grid created when a sheet has no columns yet
    pub seed_columns: usize,
    pub seed_rows: usize,
    pub undo_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1500,
            saved_display_ms: 2000,
            limits: SizeLimits::default(),
            paste: PasteLimits::default(),
            seed_columns: 5,
            seed_rows: 10,
            undo_depth: History::DEFAULT_DEPTH,
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn saved_display(&self) -> Duration {
        Duration::from_millis(self.saved_display_ms)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_toml(&content)
    }
}
