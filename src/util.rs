use std::sync::LazyLock;

use regex::Regex;

/// Declare a UUID-backed identity newtype.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

pub(crate) use define_id;

/// A zero-based (row, col) position in a sheet's index space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

static CELL_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)([0-9]+)$").expect("valid cell reference pattern"));

/// Parse column letters to 0-indexed column number (A=0, B=1, ..., Z=25, AA=26, etc.)
/// Case-insensitive. Returns None for empty input, non-letters, or overflow.
pub fn col_from_letters(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut result = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
        result = result.checked_mul(26)?.checked_add(digit)?;
    }
    Some(result - 1)
}

/// Inverse of `col_from_letters`: 0 -> "A", 25 -> "Z", 26 -> "AA"
pub fn letters_from_col(mut col: usize) -> String {
    col += 1;
    let mut buf = Vec::new();
    while col > 0 {
        col -= 1;
        let rem = (col % 26) as u8;
        buf.push((b'A' + rem) as char);
        col /= 26;
    }
    buf.into_iter().rev().collect()
}

/// Parse a cell reference like "A1" or "aa123" into a 0-indexed `CellRef`
pub fn parse_cell_ref(s: &str) -> Option<CellRef> {
    let s = s.trim().to_ascii_uppercase();
    let caps = CELL_REF_RE.captures(&s)?;

    let col = col_from_letters(caps.get(1)?.as_str())?;
    let row: usize = caps.get(2)?.as_str().parse().ok()?;
    if row == 0 {
        return None; // Rows are 1-indexed in user notation
    }

    Some(CellRef { row: row - 1, col })
}

/// Format a cell position the way a user writes it ("B3")
pub fn format_cell_ref(cell: CellRef) -> String {
    format!("{}{}", letters_from_col(cell.col), cell.row + 1)
}

/// Strict numeric parse of a raw cell value.
///
/// Surrounding whitespace is ignored. Non-finite results (`inf`, `NaN`) count as text.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a number for display: shortest round-trip form, never "-0"
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

/// Terminal display width of a string
pub fn display_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_from_letters() {
        assert_eq!(col_from_letters("A"), Some(0));
        assert_eq!(col_from_letters("B"), Some(1));
        assert_eq!(col_from_letters("Z"), Some(25));
        assert_eq!(col_from_letters("AA"), Some(26));
        assert_eq!(col_from_letters("AB"), Some(27));
        assert_eq!(col_from_letters("AZ"), Some(51));
        assert_eq!(col_from_letters("BA"), Some(52));
        assert_eq!(col_from_letters("ab"), Some(27));
        assert_eq!(col_from_letters(""), None);
        assert_eq!(col_from_letters("A1"), None);
    }

    #[test]
    fn test_letters_from_col() {
        assert_eq!(letters_from_col(0), "A");
        assert_eq!(letters_from_col(25), "Z");
        assert_eq!(letters_from_col(26), "AA");
        assert_eq!(letters_from_col(51), "AZ");
        assert_eq!(letters_from_col(52), "BA");
        assert_eq!(letters_from_col(701), "ZZ");
        assert_eq!(letters_from_col(702), "AAA");
    }

    #[test]
    fn test_letters_round_trip() {
        for col in [0, 1, 25, 26, 27, 675, 700, 701, 702, 18277] {
            assert_eq!(col_from_letters(&letters_from_col(col)), Some(col));
        }
    }

    #[test]
    fn test_parse_cell_ref() {
        let r = parse_cell_ref("A1").unwrap();
        assert_eq!(r, CellRef::new(0, 0));

        let r = parse_cell_ref("b2").unwrap();
        assert_eq!(r, CellRef::new(1, 1));

        let r = parse_cell_ref("AA10").unwrap();
        assert_eq!(r, CellRef::new(9, 26));

        assert!(parse_cell_ref("A0").is_none());
        assert!(parse_cell_ref("1A").is_none());
        assert!(parse_cell_ref("A 1").is_none());
        assert!(parse_cell_ref("").is_none());
    }

    #[test]
    fn test_format_cell_ref() {
        assert_eq!(format_cell_ref(CellRef::new(2, 1)), "B3");
        assert_eq!(format_cell_ref(CellRef::new(0, 26)), "AA1");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("5"), Some(5.0));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("5abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15.0), "15");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-4.0), "-4");
    }

    #[test]
    fn test_ids_parse_from_display() {
        use crate::grid::{ColumnId, RowId};
        use crate::persist::SheetId;

        let col = ColumnId::new();
        assert_eq!(col.to_string().parse::<ColumnId>(), Ok(col));
        let row = RowId::new();
        assert_eq!(row.to_string().parse::<RowId>(), Ok(row));
        let sheet = SheetId::new();
        assert_eq!(sheet.to_string().parse::<SheetId>(), Ok(sheet));
        assert!("not-a-uuid".parse::<ColumnId>().is_err());
    }
}
