//! Row sorting by a column's raw values

use std::cmp::Ordering;

use super::model::{ColumnId, GridModel};
use crate::error::{GridError, Result};
use crate::util::parse_number;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Pairwise comparison of two raw values: numeric when both parse as numbers,
/// otherwise lexicographic on the raw strings (so "" is the lowest text value).
///
/// Mixed pairs fall back to text comparison, so this is not a total order over
/// mixed columns; `stable_sort_by` tolerates that.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Top-down merge sort that never panics on an inconsistent comparator.
/// Equal elements keep their relative order.
fn stable_sort_by<T: Clone, F>(items: &mut Vec<T>, cmp: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() < 2 {
        return;
    }
    let mut right = items.split_off(items.len() / 2);
    stable_sort_by(items, cmp);
    stable_sort_by(&mut right, cmp);

    let left = std::mem::take(items);
    items.reserve(left.len() + right.len());

    let mut li = left.into_iter().peekable();
    let mut ri = right.into_iter().peekable();
    loop {
        let take_left = match (li.peek(), ri.peek()) {
            (Some(l), Some(r)) => cmp(l, r) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { li.next() } else { ri.next() };
        items.extend(next);
    }
}

impl GridModel {
    /// Row order (as indices into the current rows) sorted by `col`'s raw values
    pub fn sorted_row_indices(&self, col: ColumnId, direction: SortDirection) -> Result<Vec<usize>> {
        if self.column(col).is_none() {
            return Err(GridError::UnknownColumn(col));
        }
        let mut keyed: Vec<(usize, &str)> = self
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| (i, self.value(row.id, col)))
            .collect();

        let cmp_fn = |a: &(usize, &str), b: &(usize, &str)| -> Ordering {
            match direction {
                SortDirection::Ascending => compare_values(a.1, b.1),
                SortDirection::Descending => compare_values(b.1, a.1),
            }
        };
        stable_sort_by(&mut keyed, &cmp_fn);

        Ok(keyed.into_iter().map(|(i, _)| i).collect())
    }

    /// Reorder all rows by a column's values. Cells follow their rows; merges stay
    /// where they are in index space.
    pub fn sort_by_column(&mut self, col: ColumnId, direction: SortDirection) -> Result<()> {
        let permutation = self.sorted_row_indices(col, direction)?;
        let old_rows = self.rows().to_vec();
        *self.rows_vec_mut() = permutation.into_iter().map(|i| old_rows[i].clone()).collect();
        self.reindex();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_numeric_pair() {
        assert_eq!(compare_values("2", "10"), Ordering::Less);
        assert_eq!(compare_values("10", "10.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_mixed_pair_is_lexicographic() {
        assert_eq!(compare_values("10", "abc"), Ordering::Less);
        assert_eq!(compare_values("9", "1a"), Ordering::Greater);
        assert_eq!(compare_values("", "2"), Ordering::Less);
    }

    #[test]
    fn test_stable_sort_keeps_equal_order() {
        let mut items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        stable_sort_by(&mut items, &|x: &(i32, char), y: &(i32, char)| x.0.cmp(&y.0));
        assert_eq!(items, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);
    }

    #[test]
    fn test_stable_sort_survives_cyclic_comparator() {
        // 9 < 10 numerically, "10" < "1a" and "1a" < "9" lexicographically
        let mut items = vec!["10", "1a", "9", "10", "1a", "9"];
        stable_sort_by(&mut items, &|a: &&str, b: &&str| compare_values(a, b));
        assert_eq!(items.len(), 6);
    }
}
