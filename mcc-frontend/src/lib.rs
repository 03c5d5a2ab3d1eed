//! Mini C Compiler - Frontend
//!
//! This crate provides the frontend components of the compiler:
//! - Lexer: tokenizes source text
//! - Types: integer, pointer and array types with the C conversion rules
//! - AST: the typed, scope-resolved syntax tree
//! - Parser: builds the AST, resolving names and inserting conversions as it goes

pub mod lexer;
pub mod parser;
pub mod ast;
pub mod types;

pub use lexer::{Lexer, Token, TokenType};
pub use parser::{ParseError, Parser, SemanticError};
pub use ast::{
    BinaryOp, Callee, Expr, ExprKind, Function, Initializer, Stmt, StmtKind, Storage,
    TopLevelItem, TranslationUnit, VarRef, Variable,
};
pub use types::Type;

use log::debug;
use mcc_common::{CompilerError, Diagnostic, Interner};

/// Result of running the frontend over one source file
#[derive(Debug)]
pub struct Compilation {
    pub unit: TranslationUnit,
    /// Resolves every `Name` in `unit`
    pub interner: Interner,
    pub warnings: Vec<Diagnostic>,
}

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Tokenize source text; identifiers are interned into the returned table
    pub fn tokenize(source: &str, filename: &str) -> Result<(Vec<Token>, Interner), CompilerError> {
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, filename, &mut interner).tokenize()?;
        Ok((tokens, interner))
    }

    /// Lex and parse a whole translation unit
    pub fn compile(source: &str, filename: &str) -> Result<Compilation, CompilerError> {
        let (tokens, interner) = Self::tokenize(source, filename)?;

        let mut parser = Parser::new(tokens, &interner);
        let unit = parser.parse_translation_unit()?;
        let warnings = parser.into_warnings();
        debug!("frontend finished {filename} with {} warnings", warnings.len());

        Ok(Compilation {
            unit,
            interner,
            warnings,
        })
    }
}
