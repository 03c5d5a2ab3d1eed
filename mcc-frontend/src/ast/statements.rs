//! Statements, declarations and the translation unit

use crate::ast::expressions::Expr;
use crate::types::Type;
use mcc_common::{Name, SourceSpan};
use serde::Serialize;
use std::rc::Rc;

/// Shared handle to a declared variable. Every use site points at the same
/// declaration, so the code generator can find its storage without a lookup.
pub type VarRef = Rc<Variable>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: Name,
    pub ty: Type,
    pub storage: Storage,
    /// Constant initializer; only globals carry one
    pub initializer: Option<Initializer>,
    pub span: SourceSpan,
}

impl Variable {
    pub fn is_global(&self) -> bool {
        self.storage.is_global()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Storage {
    Global,
    /// Offset from the frame pointer, always negative
    Local { offset: i64 },
}

impl Storage {
    pub fn is_global(self) -> bool {
        matches!(self, Storage::Global)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Initializer {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StmtKind {
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },

    /// Also represents `while`, which has neither init nor post
    For {
        init: Option<Expr>,
        condition: Option<Expr>,
        post: Option<Expr>,
        body: Box<Stmt>,
    },

    Break,
    Continue,
    Return(Option<Expr>),
    Block(Vec<Stmt>),
    Expression(Expr),

    /// Empty statement, or a declaration without initializers
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: Name,
    pub return_type: Type,
    pub params: Vec<VarRef>,
    /// Every local declared anywhere in the body, parameters included
    pub locals: Vec<VarRef>,
    pub body: Stmt,
    /// Bytes of frame needed by all locals
    pub stack_size: u64,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TopLevelItem {
    Function(Function),
    Variable(VarRef),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationUnit {
    pub items: Vec<TopLevelItem>,
}

impl TranslationUnit {
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            TopLevelItem::Function(function) => Some(function),
            TopLevelItem::Variable(_) => None,
        })
    }

    pub fn globals(&self) -> impl Iterator<Item = &VarRef> {
        self.items.iter().filter_map(|item| match item {
            TopLevelItem::Variable(var) => Some(var),
            TopLevelItem::Function(_) => None,
        })
    }
}
