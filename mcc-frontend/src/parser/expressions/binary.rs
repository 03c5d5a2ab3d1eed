//! Binary operators, from `||` down to `*` and `/`

use crate::ast::*;
use crate::lexer::TokenType;
use crate::parser::errors::SemanticError;
use crate::parser::Parser;
use crate::types::{usual_arithmetic_conversion, Type};
use mcc_common::{CompilerError, SourceSpan};

impl<'a> Parser<'a> {
    /// Parse one left-associative tier: operands come from `next`, operators
    /// from `ops`
    fn parse_binary_tier(
        &mut self,
        ops: &[(TokenType, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, CompilerError>,
    ) -> Result<Expr, CompilerError> {
        let mut left = next(self)?;

        'tier: loop {
            for (token, op) in ops {
                if self.match_token(token) {
                    let right = next(self)?;
                    let span = left.span.to(&right.span);
                    left = self.make_binary(*op, left, right, span)?;
                    continue 'tier;
                }
            }
            return Ok(left);
        }
    }

    pub fn parse_logical_or_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_binary_tier(
            &[(TokenType::PipePipe, BinaryOp::LogicalOr)],
            Self::parse_logical_and_expression,
        )
    }

    pub fn parse_logical_and_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_binary_tier(
            &[(TokenType::AmpersandAmpersand, BinaryOp::LogicalAnd)],
            Self::parse_equality_expression,
        )
    }

    pub fn parse_equality_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_binary_tier(
            &[
                (TokenType::EqualEqual, BinaryOp::Equal),
                (TokenType::BangEqual, BinaryOp::NotEqual),
            ],
            Self::parse_relational_expression,
        )
    }

    pub fn parse_relational_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_binary_tier(
            &[
                (TokenType::Less, BinaryOp::Less),
                (TokenType::Greater, BinaryOp::Greater),
                (TokenType::LessEqual, BinaryOp::LessEqual),
                (TokenType::GreaterEqual, BinaryOp::GreaterEqual),
            ],
            Self::parse_additive_expression,
        )
    }

    pub fn parse_additive_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_binary_tier(
            &[
                (TokenType::Plus, BinaryOp::Add),
                (TokenType::Minus, BinaryOp::Sub),
            ],
            Self::parse_multiplicative_expression,
        )
    }

    pub fn parse_multiplicative_expression(&mut self) -> Result<Expr, CompilerError> {
        self.parse_binary_tier(
            &[
                (TokenType::Star, BinaryOp::Mul),
                (TokenType::Slash, BinaryOp::Div),
            ],
            Self::parse_unary_expression,
        )
    }

    /// Type a binary node. Operands whose type differs from the unified type
    /// are wrapped in conversions.
    pub fn make_binary(&mut self, op: BinaryOp, left: Expr, right: Expr, span: SourceSpan) -> Result<Expr, CompilerError> {
        let invalid = || SemanticError::invalid_operands(op, &left.ty, &right.ty, span.start.clone());

        let conversion = usual_arithmetic_conversion(&left.ty, &right.ty).ok_or_else(invalid)?;
        let (left_ptr, right_ptr) = (left.ty.decay().is_pointer(), right.ty.decay().is_pointer());

        let legal = match op {
            BinaryOp::Mul | BinaryOp::Div => !left_ptr && !right_ptr,
            BinaryOp::Add => !(left_ptr && right_ptr),
            BinaryOp::Sub => left_ptr || !right_ptr,
            _ => true,
        };
        if !legal {
            return Err(invalid().into());
        }

        let ty = if op.is_comparison() || op.is_logical() {
            Type::Int
        } else if left_ptr && right_ptr {
            // pointer difference counts elements
            Type::Long
        } else {
            conversion.common.clone()
        };

        let left = self.make_conversion(left, &conversion.common);
        let right = self.make_conversion(right, &conversion.common);
        Ok(Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            span,
        ))
    }
}
