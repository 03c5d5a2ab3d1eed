//! Statement lowering

use super::CodeGenerator;
use crate::asm::{AsmInst, Cond, Operand, Reg};
use crate::loops::LoopContext;
use mcc_common::{CompilerError, SourceSpan};
use mcc_frontend::ast::{Expr, Stmt, StmtKind};
use std::io::Write;

impl<'a, W: Write> CodeGenerator<'a, W> {
    /// Lower a statement. Only a block whose last statement is an expression
    /// hands back a register.
    pub(crate) fn generate_statement(&mut self, stmt: &Stmt) -> Result<Option<Reg>, CompilerError> {
        match &stmt.kind {
            StmtKind::Expression(expr) => Ok(Some(self.generate_expression(expr)?)),

            StmtKind::Block(stmts) => {
                let mut last = None;
                for stmt in stmts {
                    self.free(last.take(), &stmt.span)?;
                    last = self.generate_statement(stmt)?;
                }
                Ok(last)
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let false_label = self.labels.new_label();
                self.branch_if_zero(condition, &false_label)?;
                self.generate_discarded(then_branch)?;

                match else_branch {
                    Some(else_branch) => {
                        let end_label = self.labels.new_label();
                        self.emit(AsmInst::Jmp(end_label.clone()))?;
                        self.emit(AsmInst::Label(false_label))?;
                        self.generate_discarded(else_branch)?;
                        self.emit(AsmInst::Label(end_label))?;
                    }
                    None => self.emit(AsmInst::Label(false_label))?,
                }
                Ok(None)
            }

            StmtKind::For {
                init,
                condition,
                post,
                body,
            } => {
                if let Some(init) = init {
                    self.generate_discarded_expression(init)?;
                }

                let cond_label = self.labels.new_label();
                let end_label = condition.as_ref().map(|_| self.labels.new_label());
                let continue_label = post.is_none().then(|| cond_label.clone());
                self.loops.push(LoopContext::with_labels(continue_label, end_label.clone()));

                self.emit(AsmInst::Label(cond_label.clone()))?;
                if let (Some(condition), Some(end_label)) = (condition, &end_label) {
                    self.branch_if_zero(condition, end_label)?;
                }
                self.generate_discarded(body)?;

                let context = self.loops.pop().map_err(|err| err.at(&stmt.span.end))?;
                if let Some(post) = post {
                    if let Some(label) = context.continue_label {
                        self.emit(AsmInst::Label(label))?;
                    }
                    self.generate_discarded_expression(post)?;
                }
                self.emit(AsmInst::Jmp(cond_label))?;
                if let Some(label) = context.break_label {
                    self.emit(AsmInst::Label(label))?;
                }
                Ok(None)
            }

            StmtKind::DoWhile { body, condition } => {
                let start_label = self.labels.new_label();
                self.loops
                    .push(LoopContext::with_labels(Some(start_label.clone()), None));

                self.emit(AsmInst::Label(start_label.clone()))?;
                self.generate_discarded(body)?;
                let reg = self.generate_expression(condition)?;
                self.emit(AsmInst::Cmp(Operand::Imm(0), reg.into()))?;
                self.free(reg, &condition.span)?;
                self.emit(AsmInst::Jump(Cond::Ne, start_label))?;

                let context = self.loops.pop().map_err(|err| err.at(&stmt.span.end))?;
                if let Some(label) = context.break_label {
                    self.emit(AsmInst::Label(label))?;
                }
                Ok(None)
            }

            StmtKind::Break => {
                let label = self
                    .loops
                    .break_label(&mut self.labels)
                    .map_err(|err| err.at(&stmt.span.start))?;
                self.emit(AsmInst::Jmp(label))?;
                Ok(None)
            }

            StmtKind::Continue => {
                let label = self
                    .loops
                    .continue_label(&mut self.labels)
                    .map_err(|err| err.at(&stmt.span.start))?;
                self.emit(AsmInst::Jmp(label))?;
                Ok(None)
            }

            StmtKind::Return(value) => {
                if let Some(value) = value {
                    let reg = self.generate_expression(value)?;
                    self.emit(AsmInst::Mov(reg.into(), Reg::Rax.into()))?;
                    self.free(reg, &value.span)?;
                }
                self.emit(AsmInst::Jmp(self.return_label.clone()))?;
                Ok(None)
            }

            StmtKind::NoOp => Ok(None),
        }
    }

    /// Lower a nested statement and drop whatever register it returns
    fn generate_discarded(&mut self, stmt: &Stmt) -> Result<(), CompilerError> {
        let reg = self.generate_statement(stmt)?;
        self.free(reg, &stmt.span)
    }

    fn generate_discarded_expression(&mut self, expr: &Expr) -> Result<(), CompilerError> {
        let reg = self.generate_expression(expr)?;
        self.free(reg, &expr.span)
    }

    /// Evaluate `condition` and jump to `label` when it is zero
    fn branch_if_zero(&mut self, condition: &Expr, label: &str) -> Result<(), CompilerError> {
        let reg = self.generate_expression(condition)?;
        self.emit(AsmInst::Cmp(Operand::Imm(0), reg.into()))?;
        self.free(reg, &condition.span)?;
        self.emit(AsmInst::Jump(Cond::E, label.to_string()))
    }

    pub(crate) fn free(&mut self, reg: impl Into<Option<Reg>>, span: &SourceSpan) -> Result<(), CompilerError> {
        self.registers.free(reg).map_err(|err| err.at(&span.start))
    }
}
