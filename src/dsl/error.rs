//! Error type for the notation parser.

use std::fmt;

/// A syntax error found while parsing notation text.
///
/// The position is the furthest point the parser reached before every
/// alternative failed, which is almost always where the typo is.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Name of the source (file path, `<arg>`, `<stdin>`).
    pub source_name: String,
    pub line: usize,
    pub col: usize,
    /// Byte offset into the source text.
    pub offset: usize,
    /// Human-readable descriptions of what would have been accepted.
    pub expected: Vec<String>,
    /// The character found at the error position, `None` at end of input.
    pub found: Option<char>,
}

impl ParseError {
    pub fn new(
        source_name: impl Into<String>,
        position: Position,
        expected: Vec<String>,
        found: Option<char>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            line: position.line,
            col: position.col,
            offset: position.offset,
            expected,
            found,
        }
    }

    /// The expectation list joined the way it is printed.
    pub fn expected_description(&self) -> String {
        match self.expected.as_slice() {
            [] => "nothing".to_string(),
            [one] => one.clone(),
            [init @ .., last] => format!("one of {} or {}", init.join(", "), last),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = match self.found {
            Some('\n') => "newline".to_string(),
            Some(ch) => format!("'{ch}'"),
            None => "end of input".to_string(),
        };
        write!(
            f,
            "{}:{}:{}: error: expected {} at {}",
            self.source_name,
            self.line,
            self.col,
            self.expected_description(),
            found
        )
    }
}

impl std::error::Error for ParseError {}

/// A location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        col: 1,
    };
}
