//! Export projection: the header row of column names followed by every row's displayed
//! values, written as CSV or TSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::formula;
use crate::grid::GridModel;

/// Delimited output format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    /// Detect format from file extension; CSV when unknown
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("tsv") => ExportFormat::Tsv,
            _ => ExportFormat::Csv,
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }
}

/// Header plus displayed values (formulas evaluated)
pub fn export_matrix(grid: &GridModel) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(grid.row_count() + 1);
    out.push(grid.columns().iter().map(|c| c.name.clone()).collect());
    for r in 0..grid.row_count() {
        out.push((0..grid.column_count()).map(|c| formula::display_value(grid, r, c)).collect());
    }
    out
}

pub fn write_delimited<W: Write>(grid: &GridModel, writer: W, format: ExportFormat) -> io::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    for row in export_matrix(grid) {
        csv_writer
            .write_record(&row)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn export_to_path(grid: &GridModel, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_delimited(grid, BufWriter::new(file), ExportFormat::from_path(path))
}
