//! Formula evaluation
//!
//! A raw value starting with `=` is matched against `=FN(<col><row>:<col><row>)` where `FN`
//! is one of SUM, COUNT, AVG, MIN, MAX. Anything else, or a result that overflows, is
//! displayed as entered. Evaluation happens on every read: there is no cache and no
//! dependency tracking, and referenced cells contribute their raw text only (a formula
//! inside a range is non-numeric and skipped).

use std::borrow::Cow;

use thiserror::Error;

use crate::grid::GridModel;

mod aggregate;
mod lexer;
mod shape;

pub use aggregate::evaluate_call;
pub use shape::{parse_formula, Aggregate, FormulaCall, RangeRef};

/// Why a raw value was not recognized as a supported formula.
///
/// Diagnostic only: unrecognized formulas are still displayed verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Not a formula")]
    NotAFormula,

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    #[error("Expected {expected}, found {found}")]
    Expected { expected: &'static str, found: String },
}

pub fn is_formula(raw: &str) -> bool {
    raw.starts_with('=')
}

/// The value to display for a raw cell value
pub fn evaluate<'a>(raw: &'a str, grid: &GridModel) -> Cow<'a, str> {
    if !is_formula(raw) {
        return Cow::Borrowed(raw);
    }
    match parse_formula(raw).ok().and_then(|call| evaluate_call(&call, grid)) {
        Some(value) => Cow::Owned(value),
        None => Cow::Borrowed(raw),
    }
}

/// Explain why a formula would be shown unevaluated; `Ok` if it is supported
pub fn diagnose(raw: &str) -> Result<FormulaCall, FormulaError> {
    parse_formula(raw)
}

/// Display value of the cell at (row_idx, col_idx)
pub fn display_value(grid: &GridModel, row_idx: usize, col_idx: usize) -> String {
    evaluate(grid.value_at(row_idx, col_idx), grid).into_owned()
}

#[cfg(test)]
mod test;
