//! Lexer for the notation.
//!
//! The notation is dense (`ch2:c#4!7`, `2is3{...}x2`) and the meaning of a
//! letter depends on where it appears, so instead of producing a token
//! stream up front the lexer exposes lexeme readers that the parser calls
//! for the grammar position it is in. Every reader either consumes a whole
//! lexeme or nothing at all; [`Lexer::mark`] and [`Lexer::reset`] let the
//! parser backtrack across several of them.

use super::error::Position;

/// A saved lexer position for backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    index: usize,
    position: Position,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    position: Position,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            position: Position::START,
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            index: self.pos,
            position: self.position,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.index;
        self.position = mark.position;
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        self.position.offset += ch.len_utf8();
        if ch == '\n' {
            self.position.line += 1;
            self.position.col = 1;
        } else {
            self.position.col += 1;
        }
        Some(ch)
    }

    /// Skip whitespace and `//` comments.
    pub fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while !self.is_at_end() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Consume `expected` if it is the next character.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `keyword` if the input continues with exactly these characters.
    pub fn eat_str(&mut self, keyword: &str) -> bool {
        let matches = keyword
            .chars()
            .enumerate()
            .all(|(i, ch)| self.chars.get(self.pos + i) == Some(&ch));
        if matches {
            for _ in keyword.chars() {
                self.advance();
            }
        }
        matches
    }

    /// Consume the first character that satisfies `pred`.
    pub fn eat_if(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(ch) if pred(ch) => self.advance(),
            _ => None,
        }
    }

    /// Read a run of ASCII digits.
    pub fn digits(&mut self) -> Option<String> {
        let mut s = String::new();
        while let Some(ch) = self.eat_if(|c| c.is_ascii_digit()) {
            s.push(ch);
        }
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Read an identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn ident(&mut self) -> Option<String> {
        let first = self.eat_if(|c| c.is_ascii_alphabetic() || c == '_')?;
        let mut s = String::from(first);
        while let Some(ch) = self.eat_if(|c| c.is_ascii_alphanumeric() || c == '_') {
            s.push(ch);
        }
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_and_ident() {
        let mut lx = Lexer::new("120bpm sheet_1:");
        assert_eq!(lx.digits().as_deref(), Some("120"));
        assert_eq!(lx.ident().as_deref(), Some("bpm"));
        assert_eq!(lx.digits(), None);
        lx.skip_trivia();
        assert_eq!(lx.ident().as_deref(), Some("sheet_1"));
        assert!(lx.eat(':'));
        assert!(lx.is_at_end());
    }

    #[test]
    fn ident_cannot_start_with_digit() {
        let mut lx = Lexer::new("1abc");
        assert_eq!(lx.ident(), None);
        assert_eq!(lx.position(), Position::START);
    }

    #[test]
    fn eat_str_is_all_or_nothing() {
        let mut lx = Lexer::new("loox");
        assert!(!lx.eat_str("loop"));
        assert_eq!(lx.peek(), Some('l'));
        assert!(lx.eat_str("loo"));
        assert_eq!(lx.peek(), Some('x'));
    }

    #[test]
    fn skip_trivia_skips_comments() {
        let mut lx = Lexer::new("  // a comment\n\t 4{}");
        lx.skip_trivia();
        assert_eq!(lx.peek(), Some('4'));
        assert_eq!(lx.position().line, 2);
        assert_eq!(lx.position().col, 3);
    }

    #[test]
    fn single_slash_is_not_a_comment() {
        let mut lx = Lexer::new("/x");
        lx.skip_trivia();
        assert_eq!(lx.peek(), Some('/'));
    }

    #[test]
    fn mark_and_reset() {
        let mut lx = Lexer::new("ab\ncd");
        let m = lx.mark();
        lx.advance();
        lx.advance();
        lx.advance();
        assert_eq!(lx.position().line, 2);
        lx.reset(m);
        assert_eq!(lx.peek(), Some('a'));
        assert_eq!(lx.position(), Position::START);
    }

    #[test]
    fn offsets_count_bytes() {
        let mut lx = Lexer::new("é1");
        lx.advance();
        assert_eq!(lx.position().offset, 2);
        assert_eq!(lx.position().col, 2);
    }
}
