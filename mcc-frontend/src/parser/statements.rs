//! Statement parsing

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::SemanticError;
use crate::parser::Parser;
use crate::types::Type;
use mcc_common::{CompilerError, SourceSpan};

impl<'a> Parser<'a> {
    /// `{ ... }` with its own scope. Items starting with a type specifier are
    /// declarations.
    pub fn parse_compound_statement(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.current_location();
        self.expect(TokenType::LeftBrace)?;
        self.scopes.push_scope();

        let mut statements = Vec::new();
        while !self.check(&TokenType::RightBrace) && !self.tokens.is_at_end() {
            let stmt = if self.peek().token_type.is_type_specifier() {
                self.parse_local_declaration()?
            } else {
                self.parse_statement()?
            };
            statements.push(stmt);
        }

        self.expect(TokenType::RightBrace)?;
        self.scopes.pop_scope();
        Ok(Stmt::new(StmtKind::Block(statements), self.span_from(start)))
    }

    pub fn parse_statement(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.current_location();

        let kind = match self.peek().token_type {
            TokenType::LeftBrace => return self.parse_compound_statement(),
            TokenType::If => {
                self.advance();
                self.parse_if_statement()?
            }
            TokenType::While => {
                self.advance();
                self.parse_while_statement()?
            }
            TokenType::Do => {
                self.advance();
                self.parse_do_while_statement()?
            }
            TokenType::For => {
                self.advance();
                self.parse_for_statement()?
            }
            TokenType::Return => {
                self.advance();
                self.parse_return_statement()?
            }
            TokenType::Print => {
                self.advance();
                self.parse_print_statement()?
            }
            TokenType::Break => {
                self.advance();
                self.expect(TokenType::Semicolon)?;
                StmtKind::Break
            }
            TokenType::Continue => {
                self.advance();
                self.expect(TokenType::Semicolon)?;
                StmtKind::Continue
            }
            TokenType::Semicolon => {
                self.advance();
                StmtKind::NoOp
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenType::Semicolon)?;
                StmtKind::Expression(expr)
            }
        };

        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// `( expression )` used as a branch or loop condition
    fn parse_condition(&mut self) -> Result<Expr, CompilerError> {
        self.expect(TokenType::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenType::RightParen)?;
        Ok(self.require_value(condition)?)
    }

    pub(crate) fn require_value(&self, expr: Expr) -> Result<Expr, SemanticError> {
        if expr.ty.is_void() {
            return Err(SemanticError::VoidValue {
                location: expr.span.start.clone(),
            });
        }
        Ok(expr)
    }

    fn parse_if_statement(&mut self) -> Result<StmtKind, CompilerError> {
        let condition = self.parse_condition()?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(&TokenType::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `while` is a `for` with neither init nor post
    fn parse_while_statement(&mut self) -> Result<StmtKind, CompilerError> {
        let condition = self.parse_condition()?;
        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::For {
            init: None,
            condition: Some(condition),
            post: None,
            body,
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<StmtKind, CompilerError> {
        let body = Box::new(self.parse_statement()?);
        self.expect(TokenType::While)?;
        let condition = self.parse_condition()?;
        self.expect(TokenType::Semicolon)?;
        Ok(StmtKind::DoWhile { body, condition })
    }

    fn parse_optional_expression(&mut self, terminator: TokenType) -> Result<Option<Expr>, CompilerError> {
        let expr = if self.check(&terminator) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(terminator)?;
        Ok(expr)
    }

    fn parse_for_statement(&mut self) -> Result<StmtKind, CompilerError> {
        self.expect(TokenType::LeftParen)?;
        let init = self.parse_optional_expression(TokenType::Semicolon)?;
        let condition = match self.parse_optional_expression(TokenType::Semicolon)? {
            Some(condition) => Some(self.require_value(condition)?),
            None => None,
        };
        let post = self.parse_optional_expression(TokenType::RightParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(StmtKind::For {
            init,
            condition,
            post,
            body,
        })
    }

    fn parse_return_statement(&mut self) -> Result<StmtKind, CompilerError> {
        let start = self.tokens.previous_end();
        let return_type = self.function_context()?.return_type.clone();

        if self.match_token(&TokenType::Semicolon) {
            if !return_type.is_void() {
                let name = self.function_context()?.name;
                let message = format!(
                    "'return' with no value, in function \"{}\" returning non-void",
                    self.name_of(name)
                );
                self.warn(message, SourceSpan::from_location(start));
            }
            return Ok(StmtKind::Return(None));
        }

        let location = self.current_location();
        let value = self.parse_expression()?;
        self.expect(TokenType::Semicolon)?;
        if return_type.is_void() {
            return Err(SemanticError::ReturnValueInVoidFunction { location }.into());
        }
        let value = self.convert_for_assignment(value, &return_type, &location)?;
        Ok(StmtKind::Return(Some(value)))
    }

    /// `print expr;` becomes a call of the print intrinsic
    fn parse_print_statement(&mut self) -> Result<StmtKind, CompilerError> {
        let value = self.parse_expression()?;
        self.expect(TokenType::Semicolon)?;
        let value = self.require_value(value)?;

        let span = value.span.clone();
        let call = Expr::new(
            ExprKind::Call {
                callee: Callee::Print,
                args: vec![value],
            },
            Type::Int,
            span,
        );
        Ok(StmtKind::Expression(call))
    }
}
