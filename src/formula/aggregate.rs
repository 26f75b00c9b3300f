//! Aggregate evaluation over raw cell values

use super::shape::{Aggregate, FormulaCall};
use crate::grid::GridModel;
use crate::util::{format_number, parse_number};

/// Running statistics over a range. Referenced cells are read raw and never evaluated.
#[derive(Debug, Default)]
struct RangeStats {
    non_empty: usize,
    numeric: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl RangeStats {
    fn push(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.non_empty += 1;

        let Some(n) = parse_number(raw) else {
            return;
        };
        self.numeric += 1;
        self.sum += n;
        self.min = Some(self.min.map_or(n, |m| m.min(n)));
        self.max = Some(self.max.map_or(n, |m| m.max(n)));
    }
}

/// Collect stats for a call's range, clamped to the grid. Out-of-range rows and
/// columns are skipped rather than treated as errors.
fn collect(call: &FormulaCall, grid: &GridModel) -> RangeStats {
    let mut stats = RangeStats::default();
    let (start_row, end_row, start_col, end_col) = call.range.bounds();
    if grid.row_count() == 0 || grid.column_count() == 0 {
        return stats;
    }
    let end_row = end_row.min(grid.row_count() - 1);
    let end_col = end_col.min(grid.column_count() - 1);

    for r in start_row..=end_row {
        for c in start_col..=end_col {
            stats.push(grid.value_at(r, c));
        }
    }
    stats
}

/// Evaluate a recognized call to its display string.
///
/// `None` when the result overflows to a non-finite number; callers show the formula as
/// entered.
pub fn evaluate_call(call: &FormulaCall, grid: &GridModel) -> Option<String> {
    let stats = collect(call, grid);
    let result = match call.function {
        Aggregate::Count => return Some(stats.non_empty.to_string()),
        Aggregate::Sum => stats.sum,
        Aggregate::Avg if stats.numeric == 0 => 0.0,
        Aggregate::Avg => {
            let avg = stats.sum / stats.numeric as f64;
            return avg.is_finite().then(|| format!("{:.2}", avg));
        }
        Aggregate::Min => stats.min.unwrap_or(0.0),
        Aggregate::Max => stats.max.unwrap_or(0.0),
    };
    result.is_finite().then(|| format_number(result))
}
