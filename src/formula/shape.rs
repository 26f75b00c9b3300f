//! Recognition of the supported call shape: `=FN(<col><row>:<col><row>)`

use std::cmp;
use std::fmt;

use super::lexer::{Lexer, Token};
use super::FormulaError;
use crate::util::{col_from_letters, format_cell_ref, CellRef};

/// The supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    /// Case-insensitive lookup by function name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SUM" => Some(Aggregate::Sum),
            "COUNT" => Some(Aggregate::Count),
            "AVG" => Some(Aggregate::Avg),
            "MIN" => Some(Aggregate::Min),
            "MAX" => Some(Aggregate::Max),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Count => "COUNT",
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}

/// A rectangular range as written (corners may be in any order)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeRef {
    /// Normalized (start_row, end_row, start_col, end_col)
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (
            cmp::min(self.start.row, self.end.row),
            cmp::max(self.start.row, self.end.row),
            cmp::min(self.start.col, self.end.col),
            cmp::max(self.start.col, self.end.col),
        )
    }
}

/// A recognized formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaCall {
    pub function: Aggregate,
    pub range: RangeRef,
}

impl fmt::Display for FormulaCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "={}({}:{})",
            self.function.name(),
            format_cell_ref(self.range.start),
            format_cell_ref(self.range.end)
        )
    }
}

struct Matcher {
    tokens: std::vec::IntoIter<Token>,
}

impl Matcher {
    fn next(&mut self) -> Token {
        self.tokens.next().unwrap_or(Token::Eof)
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), FormulaError> {
        let tok = self.next();
        if tok == expected {
            Ok(())
        } else {
            Err(FormulaError::Expected { expected: what, found: tok.to_string() })
        }
    }

    fn cell(&mut self) -> Result<CellRef, FormulaError> {
        match self.next() {
            Token::CellRef { col, row } => {
                let text = format!("{}{}", col, row);
                let col = col_from_letters(&col).ok_or_else(|| FormulaError::InvalidReference(text.clone()))?;
                let row: usize = row.parse().map_err(|_| FormulaError::InvalidReference(text.clone()))?;
                if row == 0 {
                    return Err(FormulaError::InvalidReference(text));
                }
                Ok(CellRef::new(row - 1, col))
            }
            other => Err(FormulaError::Expected { expected: "a cell reference", found: other.to_string() }),
        }
    }
}

/// Match a raw cell value against the supported call shape
pub fn parse_formula(raw: &str) -> Result<FormulaCall, FormulaError> {
    let body = raw.strip_prefix('=').ok_or(FormulaError::NotAFormula)?;
    let mut m = Matcher { tokens: Lexer::new(body).tokenize()?.into_iter() };

    let function = match m.next() {
        Token::Ident(name) => Aggregate::from_name(&name).ok_or(FormulaError::UnknownFunction(name))?,
        other => return Err(FormulaError::Expected { expected: "a function name", found: other.to_string() }),
    };
    m.expect(Token::LParen, "'('")?;
    let start = m.cell()?;
    m.expect(Token::Colon, "':'")?;
    let end = m.cell()?;
    m.expect(Token::RParen, "')'")?;
    m.expect(Token::Eof, "end of formula")?;

    Ok(FormulaCall { function, range: RangeRef { start, end } })
}
