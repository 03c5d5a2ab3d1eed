//! Expression nodes

use crate::ast::ops::BinaryOp;
use crate::ast::statements::VarRef;
use crate::types::Type;
use mcc_common::{Name, SourceSpan};
use serde::Serialize;

/// A typed expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    IntLiteral(i64),
    StringLiteral(String),

    /// Reference to a resolved variable. Whether it is read or written depends
    /// on where it appears.
    Variable(VarRef),

    /// `target = value`; the target is always a plain variable
    Assign {
        target: VarRef,
        value: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    AddressOf(Box<Expr>),
    Deref(Box<Expr>),

    Call {
        callee: Callee,
        args: Vec<Expr>,
    },

    Subscript {
        array: Box<Expr>,
        index: Box<Expr>,
    },

    /// Implicit conversion of the operand to this node's type
    Conversion(Box<Expr>),
}

/// Target of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Callee {
    /// The built-in `print` runtime routine
    Print,
    Function(Name),
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, span: SourceSpan) -> Self {
        Self { kind, ty, span }
    }

    /// Type of the expression before any implicit conversion was applied
    pub fn source_type(&self) -> &Type {
        match &self.kind {
            ExprKind::Conversion(inner) => inner.source_type(),
            _ => &self.ty,
        }
    }

    /// Fold integer constants, honouring the width of every intermediate type
    pub fn constant_value(&self) -> Option<i64> {
        let value = match &self.kind {
            ExprKind::IntLiteral(value) => *value,
            ExprKind::Conversion(inner) if self.ty.is_integer() => inner.constant_value()?,
            ExprKind::Binary { op, left, right } if op.is_arithmetic() && self.ty.is_integer() => {
                let (l, r) = (left.constant_value()?, right.constant_value()?);
                match op {
                    BinaryOp::Add => l.wrapping_add(r),
                    BinaryOp::Sub => l.wrapping_sub(r),
                    BinaryOp::Mul => l.wrapping_mul(r),
                    BinaryOp::Div if r == 0 => return None,
                    BinaryOp::Div if self.ty.is_unsigned() => ((l as u64) / (r as u64)) as i64,
                    _ => l.wrapping_div(r),
                }
            }
            _ => return None,
        };
        Some(self.ty.truncate_constant(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(value: i64, ty: Type) -> Expr {
        Expr::new(ExprKind::IntLiteral(value), ty, SourceSpan::dummy())
    }

    fn convert(inner: Expr, ty: Type) -> Expr {
        Expr::new(ExprKind::Conversion(Box::new(inner)), ty, SourceSpan::dummy())
    }

    #[test]
    fn test_constant_folding_truncates() {
        assert_eq!(convert(int(300, Type::Int), Type::Char).constant_value(), Some(44));
        assert_eq!(convert(int(-1, Type::Int), Type::UnsignedInt).constant_value(), Some(4_294_967_295));

        let negative = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Sub,
                left: Box::new(int(0, Type::Int)),
                right: Box::new(int(7, Type::Int)),
            },
            Type::Int,
            SourceSpan::dummy(),
        );
        assert_eq!(negative.constant_value(), Some(-7));
    }

    #[test]
    fn test_division_by_zero_is_not_constant() {
        let div = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Div,
                left: Box::new(int(1, Type::Int)),
                right: Box::new(int(0, Type::Int)),
            },
            Type::Int,
            SourceSpan::dummy(),
        );
        assert_eq!(div.constant_value(), None);
    }

    #[test]
    fn test_source_type_sees_through_conversions() {
        let wrapped = convert(int(1, Type::Int), Type::pointer_to(Type::Int));
        assert_eq!(wrapped.source_type(), &Type::Int);
    }
}
