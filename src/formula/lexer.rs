use std::fmt;

use super::FormulaError;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A run of letters (function name)
    Ident(String),
    /// A cell reference like A1, aa123 (column letters kept as written)
    CellRef { col: String, row: String },
    Colon,
    LParen,
    RParen,
    /// Anything the formula shapes never use
    Other(char),
    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{}", s),
            Token::CellRef { col, row } => write!(f, "{}{}", col, row),
            Token::Colon => write!(f, ":"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Other(c) => write!(f, "{}", c),
            Token::Eof => write!(f, "end of formula"),
        }
    }
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable() }
    }

    /// Tokenize the entire input into a Vec of tokens ending in `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Token>, FormulaError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok == Token::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        out
    }

    fn next_token(&mut self) -> Result<Token, FormulaError> {
        self.skip_whitespace();

        let Some(&c) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        if c.is_ascii_alphabetic() {
            let letters = self.take_while(|c| c.is_ascii_alphabetic());
            let digits = self.take_while(|c| c.is_ascii_digit());
            if digits.is_empty() {
                return Ok(Token::Ident(letters));
            }
            if self.chars.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                let rest = self.take_while(|c| c.is_ascii_alphanumeric());
                return Err(FormulaError::InvalidReference(format!("{}{}{}", letters, digits, rest)));
            }
            return Ok(Token::CellRef { col: letters, row: digits });
        }

        self.chars.next();
        Ok(match c {
            ':' => Token::Colon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => Token::Other(other),
        })
    }
}
