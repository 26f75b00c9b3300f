use proptest::prelude::*;

use super::*;
use crate::grid::{GridModel, SizeLimits};
use crate::util::CellRef;

/// Grid with one value per row in column A (and an empty column B)
fn column_grid(values: &[&str]) -> GridModel {
    let mut grid = GridModel::seeded(SizeLimits::default(), 2, values.len());
    for (r, v) in values.iter().enumerate() {
        grid.set_value_at(r, 0, *v);
    }
    grid
}

fn eval(raw: &str, grid: &GridModel) -> String {
    evaluate(raw, grid).into_owned()
}

// === Pass-through ===

#[test]
fn plain_values_pass_through() {
    let grid = column_grid(&["1"]);
    assert_eq!(eval("hello", &grid), "hello");
    assert_eq!(eval("42", &grid), "42");
    assert_eq!(eval("", &grid), "");
    assert_eq!(eval(" =SUM(A1:A1)", &grid), " =SUM(A1:A1)");
}

#[test]
fn plain_values_are_borrowed() {
    let grid = column_grid(&["1"]);
    assert!(matches!(evaluate("text", &grid), Cow::Borrowed("text")));
}

proptest! {
    #[test]
    fn non_formula_values_are_identity(raw in "[^=].*|") {
        let grid = column_grid(&["1", "2"]);
        prop_assert_eq!(eval(&raw, &grid), raw);
    }

    #[test]
    fn unknown_functions_are_verbatim(name in "[A-Z]{1,8}") {
        prop_assume!(Aggregate::from_name(&name).is_none());
        let grid = column_grid(&["1", "2"]);
        let raw = format!("={}(A1:A2)", name);
        prop_assert_eq!(eval(&raw, &grid), raw);
    }
}

// === Aggregates ===

#[test]
fn sum_skips_non_numeric() {
    let grid = column_grid(&["5", "abc", "10"]);
    assert_eq!(eval("=SUM(A1:A3)", &grid), "15");
}

#[test]
fn count_counts_non_empty_raw_values() {
    let grid = column_grid(&["5", "abc", "10"]);
    assert_eq!(eval("=COUNT(A1:A3)", &grid), "3");

    let grid = column_grid(&["5", "", "10"]);
    assert_eq!(eval("=COUNT(A1:A3)", &grid), "2");
}

#[test]
fn avg_uses_numeric_count_and_two_decimals() {
    let grid = column_grid(&["1", "abc", "2"]);
    assert_eq!(eval("=AVG(A1:A3)", &grid), "1.50");

    let grid = column_grid(&["10", "20"]);
    assert_eq!(eval("=avg(A1:A2)", &grid), "15.00");
}

#[test]
fn min_and_max() {
    let grid = column_grid(&["3", "-7", "x", "12.5"]);
    assert_eq!(eval("=MIN(A1:A4)", &grid), "-7");
    assert_eq!(eval("=MAX(A1:A4)", &grid), "12.5");
}

#[test]
fn empty_and_text_ranges_yield_zero() {
    let empty = column_grid(&["", "", ""]);
    let text = column_grid(&["a", "b", "c"]);
    for raw in ["=SUM(A1:A3)", "=AVG(A1:A3)", "=MIN(A1:A3)", "=MAX(A1:A3)"] {
        assert_eq!(eval(raw, &empty), "0", "{} over empty range", raw);
        assert_eq!(eval(raw, &text), "0", "{} over text range", raw);
    }
    assert_eq!(eval("=COUNT(A1:A3)", &empty), "0");
}

#[test]
fn rows_beyond_grid_are_skipped() {
    let grid = column_grid(&["1", "2"]);
    assert_eq!(eval("=SUM(A1:A500)", &grid), "3");
    assert_eq!(eval("=SUM(A50:A60)", &grid), "0");
    assert_eq!(eval("=SUM(Z1:Z2)", &grid), "0");
}

#[test]
fn ranges_cover_the_full_rectangle() {
    let mut grid = column_grid(&["1", "2"]);
    grid.set_value_at(0, 1, "10");
    grid.set_value_at(1, 1, "20");
    assert_eq!(eval("=SUM(A1:B2)", &grid), "33");
    // Corners in either order
    assert_eq!(eval("=SUM(B2:A1)", &grid), "33");
}

#[test]
fn function_names_and_refs_are_case_insensitive() {
    let grid = column_grid(&["4", "6"]);
    assert_eq!(eval("=sum(a1:a2)", &grid), "10");
    assert_eq!(eval("=Max(A1:a2)", &grid), "6");
    assert_eq!(eval("= SUM( A1 : A2 )", &grid), "10");
}

#[test]
fn referenced_formulas_are_read_raw() {
    let grid = column_grid(&["5", "=SUM(A1:A1)", "=SUM(A1:A3)"]);
    // The row-3 formula includes itself and another formula; both are non-numeric text
    assert_eq!(display_value(&grid, 2, 0), "5");
    assert_eq!(display_value(&grid, 1, 0), "5");
    assert_eq!(eval("=COUNT(A1:A3)", &grid), "3");
}

#[test]
fn fractional_sum_formats_shortest() {
    let grid = column_grid(&["0.5", "0.25"]);
    assert_eq!(eval("=SUM(A1:A2)", &grid), "0.75");
}

#[test]
fn overflowing_results_show_formula_verbatim() {
    let grid = column_grid(&["1e308", "1e308"]);
    assert_eq!(eval("=SUM(A1:A2)", &grid), "=SUM(A1:A2)");
    assert_eq!(eval("=AVG(A1:A2)", &grid), "=AVG(A1:A2)");
    assert_eq!(eval("=MAX(A1:A2)", &grid), "1e308");
    assert_eq!(eval("=COUNT(A1:A2)", &grid), "2");
}

// === Unsupported shapes ===

#[test]
fn unsupported_formulas_are_verbatim() {
    let grid = column_grid(&["1", "2"]);
    for raw in [
        "=",
        "=A1+A2",
        "=SUM(A1)",
        "=SUM(A1:A2",
        "=SUM(A1:A2) + 1",
        "=MEDIAN(A1:A2)",
        "=SUM(A0:A2)",
        "=SUM(1:2)",
    ] {
        assert_eq!(eval(raw, &grid), raw);
    }
}

#[test]
fn diagnose_explains_rejections() {
    assert_eq!(diagnose("plain"), Err(FormulaError::NotAFormula));
    assert_eq!(diagnose("=MEDIAN(A1:A2)"), Err(FormulaError::UnknownFunction("MEDIAN".to_string())));
    assert_eq!(diagnose("=SUM(A0:A2)"), Err(FormulaError::InvalidReference("A0".to_string())));
    assert_eq!(
        diagnose("=SUM(A1:A2"),
        Err(FormulaError::Expected { expected: "')'", found: "end of formula".to_string() })
    );
}

#[test]
fn diagnose_accepts_supported_shape() {
    let call = diagnose("=max(b2:AA10)").unwrap();
    assert_eq!(call.function, Aggregate::Max);
    assert_eq!(call.range.start, CellRef::new(1, 1));
    assert_eq!(call.range.end, CellRef::new(9, 26));
    assert_eq!(call.to_string(), "=MAX(B2:AA10)");
}
