//! Global variables, local variables and function definitions

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::SemanticError;
use crate::parser::types::Declarator;
use crate::parser::{FunctionContext, FunctionSignature, GlobalSymbol, Parser};
use crate::types::Type;
use log::debug;
use mcc_common::{CompilerError, Name, SourceSpan};
use std::rc::Rc;

/// Arguments beyond this many would not fit in argument registers
pub const MAX_PARAMS: usize = 6;

/// Largest object or stack frame, in bytes. Frame offsets and the frame
/// adjustment must fit a 32-bit displacement.
pub const MAX_OBJECT_SIZE: u64 = 1 << 30;

/// Every local takes at least one 8-byte slot
fn slot_size(ty: &Type) -> u64 {
    ty.size().max(8).next_multiple_of(8)
}

/// Whether every path through `stmt` ends in a `return`. Loops are not
/// looked into.
fn always_returns(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Block(stmts) => stmts.last().is_some_and(always_returns),
        StmtKind::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => always_returns(then_branch) && always_returns(else_branch),
        _ => false,
    }
}

impl<'a> Parser<'a> {
    /// Speculatively read `type *... identifier (` and rewind. A match means a
    /// function definition follows.
    pub fn is_function_ahead(&mut self) -> bool {
        let checkpoint = self.tokens.snapshot();
        let is_function = self.parse_type_specifier().is_ok() && {
            self.parse_pointers(Type::Void);
            self.expect_identifier().is_ok() && self.check(&TokenType::LeftParen)
        };
        self.tokens.rewind(checkpoint);
        is_function
    }

    /// Objects must have a type with a size, and that size must fit
    fn check_declarator(&self, decl: &Declarator) -> Result<(), SemanticError> {
        if decl.ty.is_void() {
            return Err(SemanticError::VoidVariable {
                name: self.name_of(decl.name),
                location: decl.span.start.clone(),
            });
        }
        if !matches!(decl.ty.checked_size(), Some(size) if size <= MAX_OBJECT_SIZE) {
            return Err(SemanticError::ArrayTooLarge {
                name: self.name_of(decl.name),
                location: decl.span.start.clone(),
            });
        }
        Ok(())
    }

    /// `type declarator [= constant], ... ;` at file scope
    pub fn parse_global_declaration(&mut self) -> Result<Vec<VarRef>, CompilerError> {
        let base = self.parse_type_specifier()?;
        let mut vars = Vec::new();

        loop {
            let decl = self.parse_declarator(&base)?;
            self.check_declarator(&decl)?;
            if self.is_global_defined(decl.name) {
                return Err(SemanticError::Redefinition {
                    what: "global variable",
                    name: self.name_of(decl.name),
                    location: decl.span.start,
                }
                .into());
            }

            let initializer = if self.match_token(&TokenType::Equal) {
                Some(self.parse_global_initializer(&decl.ty)?)
            } else {
                None
            };

            let var = Rc::new(Variable {
                name: decl.name,
                ty: decl.ty,
                storage: Storage::Global,
                initializer,
                span: decl.span,
            });
            self.globals.push(GlobalSymbol::Variable(var.clone()));
            vars.push(var);

            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.expect(TokenType::Semicolon)?;
        Ok(vars)
    }

    fn parse_global_initializer(&mut self, ty: &Type) -> Result<Initializer, CompilerError> {
        let location = self.current_location();
        let value = self.parse_assignment_expression()?;

        if let ExprKind::StringLiteral(text) = &value.kind {
            if ty.is_pointer() {
                return Ok(Initializer::Str(text.clone()));
            }
        }
        if ty.is_array() {
            return Err(SemanticError::NonConstantInitializer { location }.into());
        }

        let converted = self.convert_for_assignment(value, ty, &location)?;
        let constant = match &converted.kind {
            ExprKind::Conversion(inner) if ty.is_pointer() => inner.constant_value(),
            _ => converted.constant_value(),
        };
        constant
            .map(Initializer::Int)
            .ok_or_else(|| SemanticError::NonConstantInitializer { location }.into())
    }

    /// Register a local in the current scope and give it a frame slot
    pub fn declare_local(&mut self, name: Name, ty: Type, span: SourceSpan) -> Result<VarRef, CompilerError> {
        if self.scopes.exists_in_current_scope(name) {
            return Err(SemanticError::Redefinition {
                what: "local variable",
                name: self.name_of(name),
                location: span.start,
            }
            .into());
        }

        let context = self.function_context()?;
        let stack_size = match context.stack_size.checked_add(slot_size(&ty)) {
            Some(size) if size <= MAX_OBJECT_SIZE => size,
            _ => {
                let function = context.name;
                return Err(SemanticError::FrameTooLarge {
                    function: self.name_of(function),
                    location: span.start,
                }
                .into());
            }
        };
        let context = self.function_context()?;
        context.stack_size = stack_size;
        let var = Rc::new(Variable {
            name,
            ty,
            storage: Storage::Local {
                offset: -(context.stack_size as i64),
            },
            initializer: None,
            span,
        });
        context.locals.push(var.clone());

        self.scopes
            .declare(name, var.clone())
            .map_err(|err| CompilerError::internal_error(format!("declaring local: {err}")))?;
        Ok(var)
    }

    /// `type declarator [= expr], ... ;` inside a block. Initializers become
    /// assignment statements.
    pub fn parse_local_declaration(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.current_location();
        let base = self.parse_type_specifier()?;
        let mut assignments = Vec::new();

        loop {
            let decl = self.parse_declarator(&base)?;
            self.check_declarator(&decl)?;
            let var = self.declare_local(decl.name, decl.ty, decl.span.clone())?;

            if self.match_token(&TokenType::Equal) {
                let value = self.parse_assignment_expression()?;
                let span = decl.span.to(&value.span);
                let target = Expr::new(ExprKind::Variable(var.clone()), var.ty.clone(), decl.span);
                let assign = self.make_assignment(target, value, span.clone())?;
                assignments.push(Stmt::new(StmtKind::Expression(assign), span));
            }

            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.expect(TokenType::Semicolon)?;
        let span = self.span_from(start);
        Ok(match assignments.len() {
            0 => Stmt::new(StmtKind::NoOp, span),
            1 => assignments.remove(0),
            _ => Stmt::new(StmtKind::Block(assignments), span),
        })
    }

    fn parse_parameters(&mut self) -> Result<Vec<VarRef>, CompilerError> {
        self.expect(TokenType::LeftParen)?;
        let mut params = Vec::new();

        if self.match_token(&TokenType::RightParen) {
            return Ok(params);
        }
        if self.check(&TokenType::Void) && self.tokens.peek_nth(1).token_type == TokenType::RightParen {
            self.advance();
            self.advance();
            return Ok(params);
        }

        loop {
            let location = self.current_location();
            let base = self.parse_type_specifier()?;
            let decl = self.parse_declarator(&base)?;
            self.check_declarator(&decl)?;
            if params.len() == MAX_PARAMS {
                return Err(SemanticError::TooManyParameters { location }.into());
            }
            params.push(self.declare_local(decl.name, decl.ty.decay(), decl.span)?);

            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.expect(TokenType::RightParen)?;
        Ok(params)
    }

    /// `type *... name ( params ) { body }`
    pub fn parse_function(&mut self) -> Result<Function, CompilerError> {
        let start = self.current_location();
        let base = self.parse_type_specifier()?;
        let return_type = self.parse_pointers(base);
        let (name, name_span) = self.expect_identifier()?;

        if self.is_global_defined(name) {
            return Err(SemanticError::Redefinition {
                what: "function",
                name: self.name_of(name),
                location: name_span.start,
            }
            .into());
        }

        self.function = Some(FunctionContext {
            name,
            return_type: return_type.clone(),
            locals: Vec::new(),
            stack_size: 0,
        });
        self.scopes.push_scope();

        let params = self.parse_parameters()?;
        self.globals.push(GlobalSymbol::Function(FunctionSignature {
            name,
            return_type: return_type.clone(),
            params: params.iter().map(|p| p.ty.clone()).collect(),
        }));

        let body = self.parse_compound_statement()?;
        self.scopes.pop_scope();

        let context = self
            .function
            .take()
            .ok_or_else(|| CompilerError::internal_error("function context lost"))?;

        let is_main = self.interner.resolve(name) == "main";
        if !return_type.is_void() && !always_returns(&body) && !is_main {
            let span = SourceSpan::from_location(self.tokens.previous_end());
            self.warn("control reaches end of non-void function".to_string(), span);
        }

        debug!(
            "parsed function {} ({} locals, {} bytes of stack)",
            self.interner.resolve(context.name),
            context.locals.len(),
            context.stack_size
        );

        Ok(Function {
            name,
            return_type,
            params,
            locals: context.locals,
            body,
            stack_size: context.stack_size,
            span: self.span_from(start),
        })
    }
}
