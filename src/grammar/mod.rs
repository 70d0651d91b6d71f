//! Grammar attempt abstraction
//!
//! The resolver never executes source text. It only asks a grammar whether
//! some bytes parse under a goal. Implementations must be deterministic:
//! the same bytes and goal always give the same outcome.

pub mod probe;
pub mod timed;

pub use probe::EcmaProbe;
pub use timed::TimeLimited;

use crate::goal::Goal;
use std::borrow::Cow;
use std::fmt;

/// Location of a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line
    pub line: u32,
    /// 1-based column, counted in characters
    pub column: u32,
    /// 0-based byte offset
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Start of input
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A failed parse attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub position: Position,
    pub message: String,
}

impl ParseFailure {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Parse-only capability for one or more goals
pub trait GrammarAttempt: Send + Sync {
    /// Attempt to parse `source` under `goal`
    fn attempt(&self, source: &[u8], goal: Goal) -> Result<(), ParseFailure>;

    /// Human-readable grammar name for logs
    fn name(&self) -> &'static str;
}

/// Goal-specific source preparation applied before each attempt
pub trait Bootstrap: Send + Sync {
    fn prepare<'a>(&self, source: &'a [u8], goal: Goal) -> Cow<'a, [u8]>;
}

/// Bootstrap that leaves the source untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBootstrap;

impl Bootstrap for NoBootstrap {
    fn prepare<'a>(&self, source: &'a [u8], _goal: Goal) -> Cow<'a, [u8]> {
        Cow::Borrowed(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_display() {
        assert_eq!(Position::new(4, 12, 80).to_string(), "4:12");
        assert_eq!(Position::start().to_string(), "1:1");
    }

    #[test]
    fn no_bootstrap_borrows() {
        let src = b"foo();";
        let prepared = NoBootstrap.prepare(src, Goal::Module);
        assert!(matches!(prepared, Cow::Borrowed(_)));
        assert_eq!(&*prepared, src);
    }
}
