//! Error types raised while parsing
//!
//! [`ParseError`] covers malformed syntax, [`SemanticError`] covers programs
//! that parse but break a scoping or typing rule. Both carry a location and
//! convert into [`CompilerError`].

use crate::ast::BinaryOp;
use crate::lexer::{Token, TokenType};
use crate::types::Type;
use mcc_common::{CompilerError, SourceLocation};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {expected} got {}", describe(.found))]
    UnexpectedToken { expected: String, found: Token },

    #[error("unknown type")]
    UnknownType { location: SourceLocation },

    #[error("{message}")]
    InvalidSyntax {
        message: String,
        location: SourceLocation,
    },
}

/// Render a token for "expected X got Y" messages: punctuation and keywords
/// are quoted, everything else is described
pub fn describe(token: &Token) -> String {
    let token_type = &token.token_type;
    match token_type {
        TokenType::Identifier(_)
        | TokenType::IntLiteral(_)
        | TokenType::CharLiteral(_)
        | TokenType::StringLiteral(_)
        | TokenType::EndOfFile => token_type.to_string(),
        other => format!("'{other}'"),
    }
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedToken { found, .. } => found.span.start.clone(),
            ParseError::UnknownType { location } | ParseError::InvalidSyntax { location, .. } => {
                location.clone()
            }
        }
    }
}

impl From<ParseError> for CompilerError {
    fn from(err: ParseError) -> Self {
        CompilerError::parse_error(err.to_string(), err.location())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("redefine {what} \"{name}\"")]
    Redefinition {
        what: &'static str,
        name: String,
        location: SourceLocation,
    },

    #[error("undefined variable \"{name}\"")]
    UndefinedVariable { name: String, location: SourceLocation },

    #[error("\"{name}\" is a function, variable expected")]
    NotAVariable { name: String, location: SourceLocation },

    #[error("function \"{name}\" not defined")]
    UndefinedFunction { name: String, location: SourceLocation },

    #[error("\"{name}\" is a variable, function expected")]
    NotAFunction { name: String, location: SourceLocation },

    #[error("function \"{name}\" expects {expected} arguments, got {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        location: SourceLocation,
    },

    #[error("variable \"{name}\" declared void")]
    VoidVariable { name: String, location: SourceLocation },

    #[error("too many parameters")]
    TooManyParameters { location: SourceLocation },

    #[error("initializer element is not constant")]
    NonConstantInitializer { location: SourceLocation },

    #[error("lvalue expected")]
    LvalueExpected { location: SourceLocation },

    #[error("lvalue required as unary '&' operand")]
    AddressOfRvalue { location: SourceLocation },

    #[error("array type '{ty}' is not assignable")]
    ArrayAssignment { ty: Type, location: SourceLocation },

    #[error("invalid operands to binary {op} (have '{left}' and '{right}')")]
    InvalidOperands {
        op: String,
        left: Type,
        right: Type,
        location: SourceLocation,
    },

    #[error("invalid type argument of unary '*' (have '{ty}')")]
    InvalidDereference { ty: Type, location: SourceLocation },

    #[error("subscripted value is neither array nor pointer")]
    NotSubscriptable { location: SourceLocation },

    #[error("array subscript is not an integer")]
    NonIntegerSubscript { location: SourceLocation },

    #[error("void value not ignored as it ought to be")]
    VoidValue { location: SourceLocation },

    #[error("array \"{name}\" is too large")]
    ArrayTooLarge { name: String, location: SourceLocation },

    #[error("local variables of function \"{function}\" exceed the stack frame limit")]
    FrameTooLarge { function: String, location: SourceLocation },

    #[error("'return' with a value, in function returning void")]
    ReturnValueInVoidFunction { location: SourceLocation },
}

impl SemanticError {
    pub fn invalid_operands(op: BinaryOp, left: &Type, right: &Type, location: SourceLocation) -> Self {
        SemanticError::InvalidOperands {
            op: op.to_string(),
            left: left.clone(),
            right: right.clone(),
            location,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            SemanticError::Redefinition { location, .. }
            | SemanticError::UndefinedVariable { location, .. }
            | SemanticError::NotAVariable { location, .. }
            | SemanticError::UndefinedFunction { location, .. }
            | SemanticError::NotAFunction { location, .. }
            | SemanticError::ArgumentCount { location, .. }
            | SemanticError::VoidVariable { location, .. }
            | SemanticError::TooManyParameters { location }
            | SemanticError::NonConstantInitializer { location }
            | SemanticError::LvalueExpected { location }
            | SemanticError::AddressOfRvalue { location }
            | SemanticError::ArrayAssignment { location, .. }
            | SemanticError::InvalidOperands { location, .. }
            | SemanticError::InvalidDereference { location, .. }
            | SemanticError::NotSubscriptable { location }
            | SemanticError::NonIntegerSubscript { location }
            | SemanticError::VoidValue { location }
            | SemanticError::ArrayTooLarge { location, .. }
            | SemanticError::FrameTooLarge { location, .. }
            | SemanticError::ReturnValueInVoidFunction { location } => location,
        }
    }
}

impl From<SemanticError> for CompilerError {
    fn from(err: SemanticError) -> Self {
        CompilerError::semantic_error(err.to_string(), err.location().clone())
    }
}
