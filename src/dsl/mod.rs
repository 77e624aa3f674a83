//! Notation compiler: source text → AST → event sequence.

pub mod ast;
pub mod context;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pitch;
pub mod translate;

pub use ast::*;
pub use error::{ParseError, Position};
pub use translate::translate;

use crate::event::EventSequence;

/// The notation compiler.
///
/// Parses source text into a tree, then lowers the tree to events.
pub struct Compiler;

impl Compiler {
    /// Parse notation into its tree. `source_name` is used in error messages.
    pub fn parse(source_name: &str, source: &str) -> Result<Node, ParseError> {
        parser::parse(source_name, source)
    }

    /// Parse and translate notation into a playable event sequence.
    pub fn compile(source_name: &str, source: &str) -> Result<EventSequence, ParseError> {
        let tree = Self::parse(source_name, source)?;
        Ok(translate(&tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_pipeline() {
        let seq = Compiler::compile("test", "8{c d}").unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.last().map(|e| e.tick), Some(96));
    }

    #[test]
    fn compile_reports_syntax_errors() {
        let err = Compiler::compile("song.kor", "8{c").unwrap_err();
        assert_eq!(err.source_name, "song.kor");
    }
}
