//! Mini C Compiler - Common Types and Utilities
//!
//! Shared infrastructure for every phase of the compiler: the error type and
//! warning channel, source locations, the identifier interner, the label
//! counter and the lexical scope stack.

pub mod error;
pub mod types;
pub mod source_loc;

pub use error::{CompilerError, Diagnostic, ErrorKind, ErrorReporter, Severity};
pub use types::*;
pub use source_loc::{SourceLocation, SourceSpan};
