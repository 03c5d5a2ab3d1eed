//! Assignment and the conversions it implies

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::SemanticError;
use crate::parser::Parser;
use crate::types::Type;
use mcc_common::{CompilerError, SourceLocation, SourceSpan};

impl<'a> Parser<'a> {
    /// Right-associative `a = b = c`
    pub fn parse_assignment_expression(&mut self) -> Result<Expr, CompilerError> {
        let left = self.parse_logical_or_expression()?;

        if self.match_token(&TokenType::Equal) {
            let right = self.parse_assignment_expression()?;
            let span = left.span.to(&right.span);
            return self.make_assignment(left, right, span);
        }

        Ok(left)
    }

    pub fn make_assignment(&mut self, target: Expr, value: Expr, span: SourceSpan) -> Result<Expr, CompilerError> {
        let var = match target.kind {
            ExprKind::Variable(var) => var,
            _ => {
                return Err(SemanticError::LvalueExpected {
                    location: target.span.start,
                }
                .into())
            }
        };
        if var.ty.is_array() {
            return Err(SemanticError::ArrayAssignment {
                ty: var.ty.clone(),
                location: target.span.start,
            }
            .into());
        }

        let value = self.convert_for_assignment(value, &var.ty, &span.start)?;
        let ty = var.ty.clone();
        Ok(Expr::new(
            ExprKind::Assign {
                target: var,
                value: Box::new(value),
            },
            ty,
            span,
        ))
    }

    /// Convert `value` to `target` as assignment, argument passing and
    /// `return` do. Warns when a constant does not survive the conversion.
    pub fn convert_for_assignment(
        &mut self,
        value: Expr,
        target: &Type,
        location: &SourceLocation,
    ) -> Result<Expr, CompilerError> {
        let value = self.require_value(value)?;
        let source = value.ty.decay();

        let compatible = if target.is_pointer() {
            source.is_integer() || source == *target
        } else {
            source.is_integer() && target.is_integer()
        };
        if !compatible {
            return Err(SemanticError::InvalidOperands {
                op: "=".to_string(),
                left: target.clone(),
                right: value.ty.clone(),
                location: location.clone(),
            }
            .into());
        }

        if target.is_integer() {
            if let Some(before) = value.constant_value() {
                let after = target.truncate_constant(before);
                if after != before {
                    let message = format!(
                        "implicit conversion from '{}' to '{}' changes value from {before} to {after}",
                        value.ty, target
                    );
                    self.warn(message, value.span.clone());
                }
            }
        }

        Ok(self.make_conversion(value, target))
    }
}
