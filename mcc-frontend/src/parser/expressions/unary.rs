//! Unary `&`, `*` and `-`

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::SemanticError;
use crate::parser::Parser;
use crate::types::Type;
use mcc_common::{CompilerError, SourceSpan};

impl<'a> Parser<'a> {
    pub fn parse_unary_expression(&mut self) -> Result<Expr, CompilerError> {
        let start = self.current_location();

        match self.peek().token_type {
            TokenType::Ampersand => {
                self.advance();
                let operand = self.parse_unary_expression()?;
                let span = self.span_from(start);
                Ok(self.make_address_of(operand, span)?)
            }
            TokenType::Star => {
                self.advance();
                let operand = self.parse_unary_expression()?;
                let span = self.span_from(start);
                Ok(self.make_deref(operand, span)?)
            }
            TokenType::Minus => {
                self.advance();
                let operand = self.parse_unary_expression()?;
                let span = self.span_from(start);
                let zero = Expr::new(
                    ExprKind::IntLiteral(0),
                    Type::Int,
                    SourceSpan::from_location(span.start.clone()),
                );
                self.make_binary(BinaryOp::Sub, zero, operand, span)
            }
            _ => self.parse_postfix_expression(),
        }
    }

    pub fn make_address_of(&self, operand: Expr, span: SourceSpan) -> Result<Expr, SemanticError> {
        match operand.kind {
            ExprKind::Variable(_) | ExprKind::Deref(_) | ExprKind::Subscript { .. } => {
                let ty = Type::pointer_to(operand.ty.clone());
                Ok(Expr::new(ExprKind::AddressOf(Box::new(operand)), ty, span))
            }
            _ => Err(SemanticError::AddressOfRvalue {
                location: operand.span.start,
            }),
        }
    }

    pub fn make_deref(&self, operand: Expr, span: SourceSpan) -> Result<Expr, SemanticError> {
        let ty = match operand.ty.base_type() {
            Some(base) if !base.is_void() => base.clone(),
            _ => {
                return Err(SemanticError::InvalidDereference {
                    ty: operand.ty.clone(),
                    location: span.start,
                })
            }
        };
        Ok(Expr::new(ExprKind::Deref(Box::new(operand)), ty, span))
    }
}
