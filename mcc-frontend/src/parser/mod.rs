//! Recursive descent parser
//!
//! Parsing and semantic analysis happen in the same pass: names are resolved
//! against the scope stack as they are read, every expression is typed when
//! it is built, and implicit conversions are inserted on the spot. The result
//! is a [`TranslationUnit`] the code generator can lower without further
//! checks.

pub mod errors;
pub mod stream;
pub mod types;
pub mod declarations;
pub mod statements;
pub mod expressions;

use crate::ast::*;
use crate::lexer::{Token, TokenType};
use crate::types::Type;
use log::debug;
use mcc_common::{
    CompilerError, Diagnostic, ErrorReporter, Interner, Name, ScopeStack, SourceLocation,
    SourceSpan,
};

pub use errors::{ParseError, SemanticError};
pub use stream::{Checkpoint, TokenStream};

/// Calling signature of a function that has been declared so far
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: Name,
    pub return_type: Type,
    pub params: Vec<Type>,
}

/// Entry of the global list
#[derive(Debug, Clone)]
pub enum GlobalSymbol {
    Variable(VarRef),
    Function(FunctionSignature),
}

impl GlobalSymbol {
    pub fn name(&self) -> Name {
        match self {
            GlobalSymbol::Variable(var) => var.name,
            GlobalSymbol::Function(sig) => sig.name,
        }
    }
}

/// Per-function state, reset at the start of every function definition
#[derive(Debug)]
pub(crate) struct FunctionContext {
    pub(crate) name: Name,
    pub(crate) return_type: Type,
    pub(crate) locals: Vec<VarRef>,
    pub(crate) stack_size: u64,
}

pub struct Parser<'a> {
    pub(crate) tokens: TokenStream,
    pub(crate) interner: &'a Interner,
    pub(crate) scopes: ScopeStack<VarRef>,
    /// Globals and functions in declaration order
    pub(crate) globals: Vec<GlobalSymbol>,
    pub(crate) function: Option<FunctionContext>,
    pub(crate) reporter: ErrorReporter,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, interner: &'a Interner) -> Self {
        Self {
            tokens: TokenStream::new(tokens),
            interner,
            scopes: ScopeStack::new(),
            globals: Vec::new(),
            function: None,
            reporter: ErrorReporter::new(),
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.peek()
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.tokens.advance()
    }

    /// Whether the current token has the same kind as `token_type`, ignoring payload
    pub(crate) fn check(&self, token_type: &TokenType) -> bool {
        std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(token_type)
    }

    /// Consume the current token if it matches
    pub(crate) fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, token_type: TokenType) -> Result<Token, ParseError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("'{token_type}'"),
                found: self.peek().clone(),
            })
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<(Name, SourceSpan), ParseError> {
        match self.peek().token_type {
            TokenType::Identifier(name) => {
                let token = self.advance();
                Ok((name, token.span))
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "identifier".to_string(),
                found: self.peek().clone(),
            }),
        }
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().span.start.clone()
    }

    /// Span from `start` to the end of the last consumed token
    pub(crate) fn span_from(&self, start: SourceLocation) -> SourceSpan {
        SourceSpan::new(start, self.tokens.previous_end())
    }

    pub(crate) fn name_of(&self, name: Name) -> String {
        self.interner.resolve(name).to_string()
    }

    pub(crate) fn warn(&mut self, message: String, span: SourceSpan) {
        self.reporter.warning(message, span);
    }

    pub(crate) fn function_context(&mut self) -> Result<&mut FunctionContext, CompilerError> {
        self.function
            .as_mut()
            .ok_or_else(|| CompilerError::internal_error("statement outside of a function"))
    }

    /// Resolve `name` as a variable: innermost scope first, then the globals
    /// from newest to oldest
    pub fn find_variable(&self, name: Name, location: &SourceLocation) -> Result<VarRef, SemanticError> {
        if let Some(var) = self.scopes.lookup(name) {
            return Ok(var.clone());
        }
        match self.globals.iter().rev().find(|symbol| symbol.name() == name) {
            Some(GlobalSymbol::Variable(var)) => Ok(var.clone()),
            Some(GlobalSymbol::Function(_)) => Err(SemanticError::NotAVariable {
                name: self.name_of(name),
                location: location.clone(),
            }),
            None => Err(SemanticError::UndefinedVariable {
                name: self.name_of(name),
                location: location.clone(),
            }),
        }
    }

    /// Resolve `name` as a callee. A local of the same name hides the function.
    pub fn find_function(
        &self,
        name: Name,
        location: &SourceLocation,
    ) -> Result<&FunctionSignature, SemanticError> {
        let not_a_function = || SemanticError::NotAFunction {
            name: self.name_of(name),
            location: location.clone(),
        };
        if self.scopes.lookup(name).is_some() {
            return Err(not_a_function());
        }
        match self.globals.iter().rev().find(|symbol| symbol.name() == name) {
            Some(GlobalSymbol::Function(sig)) => Ok(sig),
            Some(GlobalSymbol::Variable(_)) => Err(not_a_function()),
            None => Err(SemanticError::UndefinedFunction {
                name: self.name_of(name),
                location: location.clone(),
            }),
        }
    }

    pub(crate) fn is_global_defined(&self, name: Name) -> bool {
        self.globals.iter().any(|symbol| symbol.name() == name)
    }

    /// Parse a complete translation unit
    pub fn parse_translation_unit(&mut self) -> Result<TranslationUnit, CompilerError> {
        let mut items = Vec::new();

        while !self.tokens.is_at_end() {
            if self.is_function_ahead() {
                items.push(TopLevelItem::Function(self.parse_function()?));
            } else {
                let vars = self.parse_global_declaration()?;
                items.extend(vars.into_iter().map(TopLevelItem::Variable));
            }
        }

        debug!(
            "parsed {} top-level items, {}",
            items.len(),
            self.reporter.summary()
        );
        Ok(TranslationUnit { items })
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        self.reporter.diagnostics()
    }

    pub fn into_warnings(self) -> Vec<Diagnostic> {
        self.reporter.into_diagnostics()
    }
}
