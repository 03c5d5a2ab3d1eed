//! Source location tracking for diagnostics
//!
//! Every token and AST node carries a span so that errors and warnings can
//! point back at the offending text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A location in a source file (line and column are 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self::with_file(Rc::from(filename), line, column)
    }

    /// Create a location sharing an already allocated file name
    pub fn with_file(filename: Rc<str>, line: u32, column: u32) -> Self {
        Self {
            filename,
            line,
            column,
        }
    }

    /// Location used in tests and for synthesized nodes
    pub fn new_simple(line: u32, column: u32) -> Self {
        Self::new("<input>", line, column)
    }

    pub fn dummy() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// A half-open region of source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    pub fn from_location(location: SourceLocation) -> Self {
        Self {
            end: location.clone(),
            start: location,
        }
    }

    pub fn dummy() -> Self {
        Self::from_location(SourceLocation::dummy())
    }

    /// Span covering `self` through the end of `other`
    pub fn to(&self, other: &SourceSpan) -> SourceSpan {
        SourceSpan::new(self.start.clone(), other.end.clone())
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}
