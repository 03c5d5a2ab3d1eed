//! Expression parsing and typing
//!
//! One module per precedence tier. Each tier builds its nodes through the
//! `make_*` constructors, which do the type checking and insert conversions.

mod primary;
mod postfix;
mod unary;
mod binary;
mod assignment;

use crate::ast::*;
use crate::parser::Parser;
use crate::types::Type;
use mcc_common::CompilerError;

impl<'a> Parser<'a> {
    pub fn parse_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_assignment_expression()
    }

    /// Wrap `expr` so that it has type `ty`. Returns it unchanged when it
    /// already does.
    pub fn make_conversion(&self, expr: Expr, ty: &Type) -> Expr {
        if expr.ty == *ty {
            return expr;
        }
        let span = expr.span.clone();
        Expr::new(ExprKind::Conversion(Box::new(expr)), ty.clone(), span)
    }
}
