//! Postfix subscripts

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::SemanticError;
use crate::parser::Parser;
use mcc_common::{CompilerError, SourceSpan};

impl<'a> Parser<'a> {
    pub fn parse_postfix_expression(&mut self) -> Result<Expr, CompilerError> {
        let mut expr = self.parse_primary_expression()?;

        while self.match_token(&TokenType::LeftBracket) {
            let index = self.parse_expression()?;
            self.expect(TokenType::RightBracket)?;
            let span = self.span_from(expr.span.start.clone());
            expr = self.make_subscript(expr, index, span)?;
        }

        Ok(expr)
    }

    /// `array[index]` has the element type
    pub fn make_subscript(&self, array: Expr, index: Expr, span: SourceSpan) -> Result<Expr, SemanticError> {
        let ty = array
            .ty
            .base_type()
            .filter(|base| !base.is_void())
            .cloned()
            .ok_or_else(|| SemanticError::NotSubscriptable {
                location: span.start.clone(),
            })?;
        if !index.ty.is_integer() {
            return Err(SemanticError::NonIntegerSubscript {
                location: index.span.start.clone(),
            });
        }

        Ok(Expr::new(
            ExprKind::Subscript {
                array: Box::new(array),
                index: Box::new(index),
            },
            ty,
            span,
        ))
    }
}
