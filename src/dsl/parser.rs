//! Parser for the notation.
//!
//! Recursive descent with ordered alternatives and backtracking. Each
//! grammar rule returns `None` when it does not match; the caller restores
//! the lexer and tries the next alternative. Every failed expectation is
//! recorded against the furthest position reached so that the final
//! [`ParseError`] points at the real problem instead of the start of the
//! statement that contained it.

use super::ast::*;
use super::error::{ParseError, Position};
use super::lexer::Lexer;

type Rule = fn(&mut Parser) -> Option<Node>;

/// Statements accepted at the top level.
const STATEMENTS: &[Rule] = &[
    Parser::sheet,
    Parser::reference,
    Parser::bpm,
    Parser::controller,
    Parser::program,
];

/// Items accepted inside a sheet body.
const BODY_ITEMS: &[Rule] = &[
    Parser::rest,
    Parser::interval,
    Parser::tie,
    Parser::divider,
    Parser::legato,
    Parser::sheet,
    Parser::reference,
    Parser::controller,
    Parser::program,
    Parser::note,
];

/// Items accepted inside a legato phrase.
const LEGATO_ITEMS: &[Rule] = &[Parser::note, Parser::interval, Parser::divider];

/// Parse notation text into a tree rooted at a [`Node::Crate`] ending in [`Node::Eof`].
pub fn parse(source_name: &str, source: &str) -> Result<Node, ParseError> {
    Parser::new(source_name, source).parse()
}

pub struct Parser {
    lexer: Lexer,
    source_name: String,
    furthest: Position,
    expected: Vec<&'static str>,
    found: Option<char>,
}

impl Parser {
    pub fn new(source_name: &str, source: &str) -> Self {
        let lexer = Lexer::new(source);
        let found = lexer.peek();
        Self {
            lexer,
            source_name: source_name.to_string(),
            furthest: Position::START,
            expected: Vec::new(),
            found,
        }
    }

    pub fn parse(mut self) -> Result<Node, ParseError> {
        let mut nodes = Vec::new();

        loop {
            self.lexer.skip_trivia();
            if self.lexer.is_at_end() {
                break;
            }
            match self.first_of(STATEMENTS) {
                Some(node) => nodes.push(node),
                None => return Err(self.error()),
            }
        }

        nodes.push(Node::Eof);
        Ok(Node::Crate(nodes))
    }

    fn error(&self) -> ParseError {
        ParseError::new(
            self.source_name.clone(),
            self.furthest,
            self.expected.iter().map(|s| s.to_string()).collect(),
            self.found,
        )
    }

    // ---------------------------------------------------------------------
    // Combinators
    // ---------------------------------------------------------------------

    /// Run `rule`, restoring the lexer if it fails.
    fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let mark = self.lexer.mark();
        let result = rule(self);
        if result.is_none() {
            self.lexer.reset(mark);
        }
        result
    }

    fn first_of(&mut self, rules: &[Rule]) -> Option<Node> {
        rules.iter().find_map(|rule| self.attempt(*rule))
    }

    /// Record that `what` would have been accepted at the current position.
    fn expected(&mut self, what: &'static str) {
        let pos = self.lexer.position();
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
            self.found = self.lexer.peek();
        }
        if pos == self.furthest && !self.expected.contains(&what) {
            self.expected.push(what);
        }
    }

    fn expect_char(&mut self, ch: char, what: &'static str) -> bool {
        if self.lexer.eat(ch) {
            true
        } else {
            self.expected(what);
            false
        }
    }

    fn expect_str(&mut self, keyword: &str, what: &'static str) -> Option<()> {
        if self.lexer.eat_str(keyword) {
            Some(())
        } else {
            self.expected(what);
            None
        }
    }

    fn number(&mut self) -> Option<u32> {
        let mark = self.lexer.mark();
        let Some(digits) = self.lexer.digits() else {
            self.expected("digit");
            return None;
        };
        match digits.parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.lexer.reset(mark);
                self.expected("number below 4294967296");
                None
            }
        }
    }

    fn ident(&mut self, what: &'static str) -> Option<String> {
        let ident = self.lexer.ident();
        if ident.is_none() {
            self.expected(what);
        }
        ident
    }

    // ---------------------------------------------------------------------
    // Single character tokens
    // ---------------------------------------------------------------------

    fn rest(&mut self) -> Option<Node> {
        self.expect_char('.', "'.'").then_some(Node::Rest)
    }

    fn tie(&mut self) -> Option<Node> {
        self.expect_char('-', "'-'").then_some(Node::Tie)
    }

    fn divider(&mut self) -> Option<Node> {
        self.expect_char('|', "'|'").then_some(Node::Divider)
    }

    // ---------------------------------------------------------------------
    // Values
    // ---------------------------------------------------------------------

    /// `+2`, `-12`
    fn interval(&mut self) -> Option<Node> {
        let Some(sign) = self.lexer.eat_if(|c| c == '+' || c == '-') else {
            self.expected("interval");
            return None;
        };
        let mark = self.lexer.mark();
        let magnitude = self.number()?;
        let Ok(value) = i32::try_from(magnitude) else {
            self.lexer.reset(mark);
            self.expected("interval below 2147483648");
            return None;
        };
        Some(Node::Interval(if sign == '-' { -value } else { value }))
    }

    /// `120bpm`
    fn bpm(&mut self) -> Option<Node> {
        let value = self.number()?;
        self.expect_str("bpm", "'bpm'")?;
        Some(Node::Bpm(value))
    }

    /// `cc7:100`
    fn controller(&mut self) -> Option<Node> {
        if !(self.lexer.eat_str("cc") || self.lexer.eat_str("CC")) {
            self.expected("controller");
            return None;
        }
        let param = self.number()?;
        if !self.expect_char(':', "':'") {
            return None;
        }
        let value = self.number()?;
        Some(Node::Controller { param, value })
    }

    /// `pgm12`
    fn program(&mut self) -> Option<Node> {
        if !(self.lexer.eat_str("pgm") || self.lexer.eat_str("PGM")) {
            self.expected("program");
            return None;
        }
        Some(Node::Program(self.number()?))
    }

    /// `[ch<n>:]<letter>[#|b]*[<octave>][!<velocity>]`
    fn note(&mut self) -> Option<Node> {
        let channel = self.attempt(|p| {
            p.expect_str("ch", "channel")?;
            let channel = p.number()?;
            p.expect_char(':', "':'").then_some(channel)
        });

        let Some(letter) = self.lexer.eat_if(is_note_letter) else {
            self.expected("note");
            return None;
        };

        let mut accidental = String::new();
        while let Some(ch) = self.lexer.eat_if(|c| c == '#' || c == 'b') {
            accidental.push(ch);
        }

        let octave = match self.lexer.peek() {
            Some(ch) if ch.is_ascii_digit() => Some(self.number()?),
            _ => None,
        };

        let velocity = if self.lexer.eat('!') {
            let Some(code) = self.lexer.eat_if(|c| c.is_ascii_digit()) else {
                self.expected("velocity digit");
                return None;
            };
            code.to_digit(10).map(|d| d as u8)
        } else {
            None
        };

        Some(Node::Note(Note {
            channel,
            letter,
            accidental,
            octave,
            velocity,
        }))
    }

    // ---------------------------------------------------------------------
    // Blocks
    // ---------------------------------------------------------------------

    /// `(c e g)`
    fn legato(&mut self) -> Option<Node> {
        if !self.expect_char('(', "'('") {
            return None;
        }
        let mut nodes = Vec::new();
        loop {
            self.lexer.skip_trivia();
            if self.expect_char(')', "')'") {
                break;
            }
            nodes.push(self.first_of(LEGATO_ITEMS)?);
        }
        Some(Node::Legato(nodes))
    }

    /// `{label.path}` with an optional repeater.
    fn reference(&mut self) -> Option<Node> {
        if !self.expect_char('{', "'{'") {
            return None;
        }
        self.lexer.skip_trivia();
        let mut label = self.ident("label")?;
        while self.lexer.peek() == Some('.') {
            self.lexer.advance();
            label.push('.');
            label.push_str(&self.ident("label")?);
        }
        self.lexer.skip_trivia();
        if !self.expect_char('}', "'}'") {
            return None;
        }
        let repeat = self.repeater();
        Some(Node::Reference(Reference { label, repeat }))
    }

    /// `[label:]<duration-expr>{<body>}[x<n>|loop]`
    fn sheet(&mut self) -> Option<Node> {
        let label = self.attempt(|p| {
            let label = p.ident("label")?;
            p.expect_char(':', "':'").then_some(label)
        });

        let (units, duration) = self.duration()?;

        if !self.expect_char('{', "'{'") {
            return None;
        }
        let mut nodes = Vec::new();
        loop {
            self.lexer.skip_trivia();
            if self.expect_char('}', "'}'") {
                break;
            }
            nodes.push(self.first_of(BODY_ITEMS)?);
        }

        let repeat = self.repeater();
        Some(Node::Sheet(Sheet {
            label,
            units,
            duration,
            repeat,
            nodes,
        }))
    }

    /// `<units>is<duration>`, `<units>as<duration>`, `<units>to<duration>` or `<duration>`.
    fn duration(&mut self) -> Option<(u32, u32)> {
        let first = self.number()?;
        let ratio = self.attempt(|p| {
            if !(p.lexer.eat_str("is") || p.lexer.eat_str("as") || p.lexer.eat_str("to")) {
                p.expected("'is', 'as' or 'to'");
                return None;
            }
            p.number()
        });
        Some(match ratio {
            Some(duration) => (first, duration),
            None => (1, first),
        })
    }

    /// `x<n>` or `loop`; a missing repeater plays the body once.
    fn repeater(&mut self) -> Repeat {
        if let Some(n) = self.attempt(|p| {
            p.expect_char('x', "'x'").then_some(())?;
            p.number()
        }) {
            return Repeat::from_count(n);
        }
        if self.lexer.eat_str("loop") {
            return Repeat::Forever;
        }
        self.expected("'loop'");
        Repeat::default()
    }
}

fn is_note_letter(ch: char) -> bool {
    matches!(ch.to_ascii_lowercase(), 'c' | 'd' | 'e' | 'f' | 'g' | 'a' | 'b')
}
