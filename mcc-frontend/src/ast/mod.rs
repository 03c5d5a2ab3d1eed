//! Abstract Syntax Tree
//!
//! The parser produces a fully typed, scope-resolved tree: every expression
//! carries its result type and every variable reference points at the
//! declaration it resolved to. The code generator only reads it.

pub mod ops;
pub mod expressions;
pub mod statements;

pub use ops::BinaryOp;
pub use expressions::{Callee, Expr, ExprKind};
pub use statements::{
    Function, Initializer, Stmt, StmtKind, Storage, TopLevelItem, TranslationUnit, Variable,
    VarRef,
};
