//! Clipboard interchange: tab/newline text codec, system clipboard access and
//! pasting with auto-growing bounds.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GridError, Result};
use crate::grid::GridModel;
use crate::util::CellRef;

/// Serialize a block of raw values: cells joined by tab, rows by newline
pub fn encode(block: &[Vec<String>]) -> String {
    block
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse pasted text into a rectangular block.
///
/// Accepts `\n` and `\r\n` line endings and ignores one trailing line terminator
/// (external spreadsheet tools append one). Short rows are padded with empty cells.
pub fn decode(text: &str) -> Vec<Vec<String>> {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }

    let mut block: Vec<Vec<String>> = text
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.split('\t').map(|s| s.to_string()).collect()
        })
        .collect();

    let width = block.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in block.iter_mut() {
        row.resize(width, String::new());
    }
    block
}

/// Access to the operating system clipboard
pub trait SystemClipboard {
    fn get_text(&mut self) -> std::result::Result<String, String>;
    fn set_text(&mut self, text: &str) -> std::result::Result<(), String>;
}

/// System clipboard backed by `arboard`
#[derive(Debug, Default)]
pub struct ArboardClipboard;

impl SystemClipboard for ArboardClipboard {
    fn get_text(&mut self) -> std::result::Result<String, String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| format!("Clipboard error: {}", e))?;
        clipboard.get_text().map_err(|e| format!("Clipboard error: {}", e))
    }

    fn set_text(&mut self, text: &str) -> std::result::Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| format!("Clipboard error: {}", e))?;
        clipboard.set_text(text).map_err(|e| format!("Clipboard error: {}", e))
    }
}

/// In-process clipboard for headless hosts and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub text: Option<String>,
}

impl SystemClipboard for MemoryClipboard {
    fn get_text(&mut self) -> std::result::Result<String, String> {
        self.text.clone().ok_or_else(|| "Clipboard is empty".to_string())
    }

    fn set_text(&mut self, text: &str) -> std::result::Result<(), String> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

/// Result of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    pub rows: usize,
    pub cols: usize,
    /// Whether the system clipboard accepted the text
    pub system: bool,
}

/// Clipboard with an internal buffer and an optional system backend.
///
/// Copies always land in the internal buffer and are also written to the system clipboard
/// as delimited text, so they can be pasted into other applications. Pastes prefer the
/// system clipboard (it may hold text from elsewhere) and fall back to the buffer.
pub struct Clipboard {
    buffer: Option<Vec<Vec<String>>>,
    system: Option<Box<dyn SystemClipboard>>,
}

impl Clipboard {
    /// Internal buffer only
    pub fn new() -> Self {
        Self { buffer: None, system: None }
    }

    pub fn with_system(system: Box<dyn SystemClipboard>) -> Self {
        Self { buffer: None, system: Some(system) }
    }

    pub fn copy(&mut self, block: Vec<Vec<String>>) -> CopyOutcome {
        let rows = block.len();
        let cols = block.first().map(|r| r.len()).unwrap_or(0);
        let text = encode(&block);
        self.buffer = Some(block);

        let system = match self.system.as_mut() {
            Some(sys) => match sys.set_text(&text) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "system clipboard write failed; copy kept internally");
                    false
                }
            },
            None => false,
        };
        debug!(rows, cols, system, "copied block");
        CopyOutcome { rows, cols, system }
    }

    /// Block to paste: system clipboard text if readable and non-empty, else the buffer
    pub fn read(&mut self) -> Result<Vec<Vec<String>>> {
        if let Some(sys) = self.system.as_mut() {
            match sys.get_text() {
                Ok(text) => {
                    let block = decode(&text);
                    if !block.is_empty() {
                        return Ok(block);
                    }
                }
                Err(e) => debug!(error = %e, "system clipboard unreadable; using internal buffer"),
            }
        }
        self.buffer.clone().filter(|b| !b.is_empty()).ok_or(GridError::EmptyPaste)
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Caps on how far one paste may grow the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteLimits {
    pub max_new_rows: usize,
    pub max_new_cols: usize,
}

impl Default for PasteLimits {
    fn default() -> Self {
        Self { max_new_rows: 100, max_new_cols: 100 }
    }
}

/// How a block will land on a grid of a given size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastePlan {
    pub rows_added: usize,
    pub cols_added: usize,
    pub cells_written: usize,
    pub cells_dropped: usize,
}

impl PastePlan {
    pub fn new(grid: &GridModel, anchor: CellRef, block: &[Vec<String>], limits: PasteLimits) -> Self {
        let block_rows = block.len();
        let block_cols = block.iter().map(|r| r.len()).max().unwrap_or(0);

        let needed_rows = anchor.row + block_rows;
        let needed_cols = anchor.col + block_cols;
        let rows_added = needed_rows.saturating_sub(grid.row_count()).min(limits.max_new_rows);
        let cols_added = needed_cols.saturating_sub(grid.column_count()).min(limits.max_new_cols);

        let final_rows = grid.row_count() + rows_added;
        let final_cols = grid.column_count() + cols_added;
        let fit_rows = final_rows.saturating_sub(anchor.row).min(block_rows);
        let fit_cols = final_cols.saturating_sub(anchor.col).min(block_cols);

        let total: usize = block.iter().map(|r| r.len()).sum();
        let cells_written = block
            .iter()
            .take(fit_rows)
            .map(|r| r.len().min(fit_cols))
            .sum();

        Self { rows_added, cols_added, cells_written, cells_dropped: total - cells_written }
    }
}

/// Write a block at `anchor`, growing the grid as needed within `limits`.
///
/// New columns are named by continuing the letter sequence. Only raw values are written:
/// existing styles at the target cells are kept. Cells past the caps are dropped.
pub fn paste_block(grid: &mut GridModel, anchor: CellRef, block: &[Vec<String>], limits: PasteLimits) -> PastePlan {
    let plan = PastePlan::new(grid, anchor, block, limits);
    for _ in 0..plan.rows_added {
        grid.append_row();
    }
    for _ in 0..plan.cols_added {
        grid.add_column();
    }

    for (dr, row) in block.iter().enumerate() {
        for (dc, value) in row.iter().enumerate() {
            grid.set_value_at(anchor.row + dr, anchor.col + dc, value.clone());
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellStyle, SizeLimits};

    fn block(data: Vec<Vec<&str>>) -> Vec<Vec<String>> {
        data.into_iter()
            .map(|row| row.into_iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn make_grid(rows: usize, cols: usize) -> GridModel {
        GridModel::seeded(SizeLimits::default(), cols, rows)
    }

    // === Codec ===

    #[test]
    fn test_encode() {
        assert_eq!(encode(&block(vec![vec!["a", "b"], vec!["c", ""]])), "a\tb\nc\t");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_pads_to_rectangle() {
        assert_eq!(decode("a\tb\tc\nd"), block(vec![vec!["a", "b", "c"], vec!["d", "", ""]]));
    }

    #[test]
    fn test_decode_handles_crlf_and_trailing_newline() {
        assert_eq!(decode("1\t2\r\n3\t4\r\n"), block(vec![vec!["1", "2"], vec!["3", "4"]]));
        assert_eq!(decode("x\n"), block(vec![vec!["x"]]));
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").is_empty());
        assert!(decode("\n").is_empty());
    }

    #[test]
    fn test_decode_keeps_inner_blank_lines() {
        assert_eq!(decode("a\n\nb"), block(vec![vec!["a"], vec![""], vec!["b"]]));
    }

    #[test]
    fn test_round_trip_text() {
        let data = block(vec![vec!["=SUM(A1:A2)", "x"], vec!["", "3"]]);
        assert_eq!(decode(&encode(&data)), data);
    }

    // === Clipboard ===

    #[test]
    fn test_copy_writes_system_and_buffer() {
        let mut clipboard = Clipboard::with_system(Box::new(MemoryClipboard::default()));
        let outcome = clipboard.copy(block(vec![vec!["1", "2"]]));
        assert_eq!(outcome, CopyOutcome { rows: 1, cols: 2, system: true });
        assert_eq!(clipboard.read().unwrap(), block(vec![vec!["1", "2"]]));
    }

    #[test]
    fn test_read_prefers_system_text() {
        let system = MemoryClipboard { text: Some("from\telsewhere".to_string()) };
        let mut clipboard = Clipboard::with_system(Box::new(system));
        assert_eq!(clipboard.read().unwrap(), block(vec![vec!["from", "elsewhere"]]));
    }

    #[test]
    fn test_read_falls_back_to_buffer() {
        let mut clipboard = Clipboard::new();
        assert_eq!(clipboard.read(), Err(GridError::EmptyPaste));
        clipboard.copy(block(vec![vec!["kept"]]));
        assert_eq!(clipboard.read().unwrap(), block(vec![vec!["kept"]]));
    }

    // === Paste ===

    #[test]
    fn test_paste_inside_bounds() {
        let mut grid = make_grid(3, 3);
        let plan = paste_block(&mut grid, CellRef::new(1, 1), &block(vec![vec!["a", "b"], vec!["c", "d"]]), PasteLimits::default());

        assert_eq!(plan, PastePlan { rows_added: 0, cols_added: 0, cells_written: 4, cells_dropped: 0 });
        assert_eq!(grid.values_in(1, 2, 1, 2), block(vec![vec!["a", "b"], vec!["c", "d"]]));
        assert_eq!(grid.value_at(0, 0), "");
    }

    #[test]
    fn test_paste_grows_by_exactly_what_is_needed() {
        let mut grid = make_grid(2, 2);
        let data = block(vec![vec!["1", "2", "3"], vec!["4", "5", "6"], vec!["7", "8", "9"]]);
        let plan = paste_block(&mut grid, CellRef::new(1, 1), &data, PasteLimits::default());

        assert_eq!(plan.rows_added, 2);
        assert_eq!(plan.cols_added, 2);
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.column_count(), 4);
        assert_eq!(grid.values_in(1, 3, 1, 3), data);

        let names: Vec<&str> = grid.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_paste_growth_is_capped() {
        let mut grid = make_grid(1, 1);
        let data: Vec<Vec<String>> = (0..150).map(|r| vec![r.to_string(); 3]).collect();
        let limits = PasteLimits { max_new_rows: 100, max_new_cols: 1 };
        let plan = paste_block(&mut grid, CellRef::new(0, 0), &data, limits);

        assert_eq!(plan.rows_added, 100);
        assert_eq!(plan.cols_added, 1);
        assert_eq!(grid.row_count(), 101);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(plan.cells_written, 101 * 2);
        assert_eq!(plan.cells_dropped, 150 * 3 - 101 * 2);
        assert_eq!(grid.value_at(100, 1), "100");
    }

    #[test]
    fn test_paste_preserves_target_styles() {
        let mut grid = make_grid(2, 2);
        let (row, col) = (grid.row_at(0).unwrap().id, grid.column_at(0).unwrap().id);
        grid.apply_style(row, col, &CellStyle::background("#abc")).unwrap();

        paste_block(&mut grid, CellRef::new(0, 0), &block(vec![vec!["new"]]), PasteLimits::default());

        let cell = grid.cell(row, col).unwrap();
        assert_eq!(cell.value, "new");
        assert_eq!(cell.style, Some(CellStyle::background("#abc")));
    }
}
