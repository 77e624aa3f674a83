//! Abstract Syntax Tree for the notation.
//!
//! Every container node owns its children; there are no back-edges. The
//! [`fmt::Display`] impl prints the tree as an S-expression, which is what
//! `--print-ast` shows and what the parser tests compare against.

use std::fmt;

/// A node of the notation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Tempo change, e.g. `120bpm`.
    Bpm(u32),
    Note(Note),
    /// Signed semitone offset from the previous tone, e.g. `+2`.
    Interval(i32),
    /// `.`
    Rest,
    /// `-`
    Tie,
    /// `|`, a readability marker with no effect.
    Divider,
    /// Control change, e.g. `cc7:100`.
    Controller { param: u32, value: u32 },
    /// Program change, e.g. `pgm12`.
    Program(u32),
    /// `( ... )` phrase whose notes overlap slightly.
    Legato(Vec<Node>),
    Sheet(Sheet),
    Reference(Reference),
    /// A sequencing group. The parser wraps the top level in one.
    Crate(Vec<Node>),
    /// Appended once at the end of the top-level crate.
    Eof,
}

/// A note; unset fields inherit from the translation context.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub channel: Option<u32>,
    /// The note letter as written (`c`..`b`, either case).
    pub letter: char,
    /// Stacked `#` and `b` characters.
    pub accidental: String,
    pub octave: Option<u32>,
    /// Velocity code 0-9.
    pub velocity: Option<u8>,
}

/// A rhythmic block, e.g. `verse:2is3{c d e}x2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub label: Option<String>,
    pub units: u32,
    pub duration: u32,
    pub repeat: Repeat,
    pub nodes: Vec<Node>,
}

impl Sheet {
    /// Factor applied to the parent divider for the children of this sheet.
    ///
    /// `None` when either side of the ratio is zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.units == 0 || self.duration == 0 {
            return None;
        }
        Some(self.duration as f64 / self.units as f64)
    }
}

/// A replay of a labeled sheet, e.g. `{verse.chorus}x2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Dotted label path.
    pub label: String,
    pub repeat: Repeat,
}

/// How many times a sheet or reference body is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play the body this many times (`x3`, or once when no repeater is given).
    Times(u32),
    /// `x0`: walk the body for its side effects only.
    DryRun,
    /// `loop`: play the body forever.
    Forever,
}

impl Repeat {
    /// Build from a repeater count written as `x<n>`.
    pub fn from_count(n: u32) -> Self {
        if n == 0 {
            Repeat::DryRun
        } else {
            Repeat::Times(n)
        }
    }

    /// The tri-state integer form: positive, zero for a dry run, -1 for a loop.
    pub fn count(self) -> i64 {
        match self {
            Repeat::Times(n) => n as i64,
            Repeat::DryRun => 0,
            Repeat::Forever => -1,
        }
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(1)
    }
}

fn unset_or<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-1".to_string(), |v| v.to_string())
}

fn write_children(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for node in nodes {
        write!(f, " {node}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Bpm(v) => write!(f, "(BPM v:{v})"),
            Node::Note(n) => write!(
                f,
                "(NOTE ch:{} n:{} a:{} o:{} v:{})",
                unset_or(n.channel),
                n.letter,
                n.accidental,
                unset_or(n.octave),
                unset_or(n.velocity)
            ),
            Node::Interval(v) => write!(f, "(INTERVAL v:{v})"),
            Node::Rest => write!(f, "(REST)"),
            Node::Tie => write!(f, "(TIE)"),
            Node::Divider => write!(f, "(DIVIDER)"),
            Node::Controller { param, value } => write!(f, "(CC p:{param} v:{value})"),
            Node::Program(v) => write!(f, "(PGM v:{v})"),
            Node::Legato(nodes) => {
                write!(f, "(LEGATO")?;
                write_children(f, nodes)
            }
            Node::Sheet(s) => {
                write!(
                    f,
                    "(SHEET l:{} u:{} d:{} r:{}",
                    s.label.as_deref().unwrap_or(""),
                    s.units,
                    s.duration,
                    s.repeat.count()
                )?;
                write_children(f, &s.nodes)
            }
            Node::Reference(r) => write!(f, "(REFERENCE l:{} r:{})", r.label, r.repeat.count()),
            Node::Crate(nodes) => {
                write!(f, "(CRATE")?;
                write_children(f, nodes)
            }
            Node::Eof => write!(f, "(EOF)"),
        }
    }
}
