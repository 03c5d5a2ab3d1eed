//! Literals, names, calls and parenthesized expressions

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::{ParseError, SemanticError};
use crate::parser::Parser;
use crate::types::Type;
use mcc_common::{CompilerError, Name, SourceLocation};

/// Integer literals are `int` when they fit, `long` otherwise
fn literal_type(value: i64) -> Type {
    if i32::try_from(value).is_ok() {
        Type::Int
    } else {
        Type::Long
    }
}

impl<'a> Parser<'a> {
    pub fn parse_primary_expression(&mut self) -> Result<Expr, CompilerError> {
        let start = self.current_location();

        let (kind, ty) = match self.peek().token_type.clone() {
            TokenType::IntLiteral(value) => {
                self.advance();
                (ExprKind::IntLiteral(value), literal_type(value))
            }
            TokenType::CharLiteral(value) => {
                self.advance();
                (ExprKind::IntLiteral(value as i64), Type::Int)
            }
            TokenType::StringLiteral(mut text) => {
                self.advance();
                // adjacent literals concatenate
                while let TokenType::StringLiteral(next) = &self.peek().token_type {
                    text.push_str(next);
                    self.advance();
                }
                (ExprKind::StringLiteral(text), Type::pointer_to(Type::Char))
            }
            TokenType::Identifier(name) => {
                self.advance();
                if self.check(&TokenType::LeftParen) {
                    return self.parse_call(name, start);
                }
                let var = self.find_variable(name, &start)?;
                let ty = var.ty.clone();
                (ExprKind::Variable(var), ty)
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenType::RightParen)?;
                return Ok(expr);
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: self.peek().clone(),
                }
                .into())
            }
        };

        Ok(Expr::new(kind, ty, self.span_from(start)))
    }

    /// `name ( args )`; the callee must already be declared
    fn parse_call(&mut self, name: Name, start: SourceLocation) -> Result<Expr, CompilerError> {
        let signature = self.find_function(name, &start)?.clone();

        self.expect(TokenType::LeftParen)?;
        let mut args = Vec::new();
        if !self.match_token(&TokenType::RightParen) {
            loop {
                args.push(self.parse_assignment_expression()?);
                if !self.match_token(&TokenType::Comma) {
                    break;
                }
            }
            self.expect(TokenType::RightParen)?;
        }

        if args.len() != signature.params.len() {
            return Err(SemanticError::ArgumentCount {
                name: self.name_of(name),
                expected: signature.params.len(),
                found: args.len(),
                location: start,
            }
            .into());
        }

        let args = args
            .into_iter()
            .zip(&signature.params)
            .map(|(arg, param)| {
                let location = arg.span.start.clone();
                self.convert_for_assignment(arg, param, &location)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expr::new(
            ExprKind::Call {
                callee: Callee::Function(name),
                args,
            },
            signature.return_type,
            self.span_from(start),
        ))
    }
}
