//! Error handling for the Mini C compiler
//!
//! Every phase reports failures through [`CompilerError`]. The variants fall
//! into two groups: source errors, which describe a problem with the program
//! being compiled, and internal errors, which mean a compiler invariant broke.
//! Non-fatal advisories travel separately as [`Diagnostic`] warnings collected
//! by an [`ErrorReporter`].

use crate::source_loc::{SourceLocation, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("{location}: error: {message}")]
    LexError {
        location: SourceLocation,
        message: String,
    },

    #[error("{location}: error: {message}")]
    ParseError {
        location: SourceLocation,
        message: String,
    },

    #[error("{location}: error: {message}")]
    SemanticError {
        location: SourceLocation,
        message: String,
    },

    #[error("{location}: error: {message}")]
    CodegenError {
        location: SourceLocation,
        message: String,
    },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("internal compiler error: {message}")]
    InternalError { message: String },
}

/// Broad classification of a [`CompilerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input program is malformed or ill-typed
    Source,
    /// A compiler invariant was violated
    Internal,
    /// Reading input or writing output failed
    Io,
}

impl CompilerError {
    pub fn lexer_error(message: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::LexError {
            location,
            message: message.into(),
        }
    }

    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::ParseError {
            location,
            message: message.into(),
        }
    }

    pub fn semantic_error(message: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::SemanticError {
            location,
            message: message.into(),
        }
    }

    pub fn codegen_error(message: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::CodegenError {
            location,
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        CompilerError::InternalError {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompilerError::LexError { .. }
            | CompilerError::ParseError { .. }
            | CompilerError::SemanticError { .. }
            | CompilerError::CodegenError { .. } => ErrorKind::Source,
            CompilerError::IoError { .. } => ErrorKind::Io,
            CompilerError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// The bare message without the location prefix
    pub fn message(&self) -> &str {
        match self {
            CompilerError::LexError { message, .. }
            | CompilerError::ParseError { message, .. }
            | CompilerError::SemanticError { message, .. }
            | CompilerError::CodegenError { message, .. }
            | CompilerError::IoError { message }
            | CompilerError::InternalError { message } => message,
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompilerError::LexError { location, .. }
            | CompilerError::ParseError { location, .. }
            | CompilerError::SemanticError { location, .. }
            | CompilerError::CodegenError { location, .. } => Some(location),
            CompilerError::IoError { .. } | CompilerError::InternalError { .. } => None,
        }
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Bare strings are treated as internal failures
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: SourceSpan,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: String, span: SourceSpan) -> Self {
        Self {
            severity,
            message,
            span,
            notes: Vec::new(),
        }
    }

    pub fn error(message: String, span: SourceSpan) -> Self {
        Self::with_severity(Severity::Error, message, span)
    }

    pub fn warning(message: String, span: SourceSpan) -> Self {
        Self::with_severity(Severity::Warning, message, span)
    }

    pub fn note(message: String, span: SourceSpan) -> Self {
        Self::with_severity(Severity::Note, message, span)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.span.start, self.severity, self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

/// Collects diagnostics that do not stop compilation
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        self.diagnostics.push(diagnostic);
        let index = self.diagnostics.len() - 1;
        &mut self.diagnostics[index]
    }

    pub fn error(&mut self, message: String, span: SourceSpan) -> &mut Diagnostic {
        self.error_count += 1;
        self.push(Diagnostic::error(message, span))
    }

    pub fn warning(&mut self, message: String, span: SourceSpan) -> &mut Diagnostic {
        log::debug!("warning recorded: {message}");
        self.warning_count += 1;
        self.push(Diagnostic::warning(message, span))
    }

    pub fn note(&mut self, message: String, span: SourceSpan) -> &mut Diagnostic {
        self.push(Diagnostic::note(message, span))
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn summary(&self) -> String {
        fn plural(n: usize, word: &str) -> String {
            format!("{n} {word}{}", if n == 1 { "" } else { "s" })
        }
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => plural(w, "warning"),
            (e, 0) => plural(e, "error"),
            (e, w) => format!("{} and {}", plural(e, "error"), plural(w, "warning")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span() -> SourceSpan {
        SourceSpan::new(
            SourceLocation::new("test.c", 3, 7),
            SourceLocation::new("test.c", 3, 9),
        )
    }

    #[test]
    fn test_source_and_internal_kinds() {
        let err = CompilerError::parse_error("expected ';' got '}'", SourceLocation::new("a.c", 1, 2));
        assert_eq!(err.kind(), ErrorKind::Source);
        assert!(!err.is_internal());
        assert_eq!(err.to_string(), "a.c:1:2: error: expected ';' got '}'");

        let bug = CompilerError::internal_error("double free of register r8");
        assert!(bug.is_internal());
        assert_eq!(bug.location(), None);
        assert_eq!(bug.to_string(), "internal compiler error: double free of register r8");
    }

    #[test]
    fn test_string_converts_to_internal() {
        let err: CompilerError = "loop stack underflow".to_string().into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "loop stack underflow");
    }

    #[test]
    fn test_warning_display_has_location() {
        let diag = Diagnostic::warning("unused value".to_string(), span())
            .with_note("computed here".to_string());
        assert_eq!(diag.to_string(), "test.c:3:7: warning: unused value\n  note: computed here");
    }

    #[test]
    fn test_reporter_counts_and_summary() {
        let mut reporter = ErrorReporter::new();
        assert_eq!(reporter.summary(), "No errors or warnings");

        reporter.warning("w1".to_string(), span());
        assert_eq!(reporter.summary(), "1 warning");
        assert!(!reporter.has_errors());

        reporter.error("e1".to_string(), span());
        reporter.warning("w2".to_string(), span());
        assert_eq!(reporter.summary(), "1 error and 2 warnings");
        assert_eq!(reporter.diagnostics().len(), 3);
    }
}
