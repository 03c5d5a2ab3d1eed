//! Expression lowering
//!
//! Every expression returns the register holding its value. Binary operators
//! compute into the left operand's register and release the right one.

use super::CodeGenerator;
use crate::asm::{AsmInst, Cond, Operand, Reg, Width};
use mcc_common::{CompilerError, SourceSpan};
use mcc_frontend::ast::{BinaryOp, Expr, ExprKind};
use mcc_frontend::types::Type;
use std::io::Write;

fn fits_in_imm32(value: i64) -> bool {
    i32::try_from(value).is_ok()
}

/// Condition code for a comparison of operands of type `ty`
fn condition_code(op: BinaryOp, ty: &Type) -> Option<Cond> {
    let unsigned = ty.is_unsigned() || ty.is_pointer();
    let cond = match (op, unsigned) {
        (BinaryOp::Equal, _) => Cond::E,
        (BinaryOp::NotEqual, _) => Cond::Ne,
        (BinaryOp::Less, false) => Cond::L,
        (BinaryOp::Greater, false) => Cond::G,
        (BinaryOp::LessEqual, false) => Cond::Le,
        (BinaryOp::GreaterEqual, false) => Cond::Ge,
        (BinaryOp::Less, true) => Cond::B,
        (BinaryOp::Greater, true) => Cond::A,
        (BinaryOp::LessEqual, true) => Cond::Be,
        (BinaryOp::GreaterEqual, true) => Cond::Ae,
        _ => return None,
    };
    Some(cond)
}

impl<'a, W: Write> CodeGenerator<'a, W> {
    pub(crate) fn alloc(&mut self, span: &SourceSpan) -> Result<Reg, CompilerError> {
        self.registers.alloc().map_err(|err| err.at(&span.start))
    }

    pub(crate) fn generate_expression(&mut self, expr: &Expr) -> Result<Reg, CompilerError> {
        match &expr.kind {
            ExprKind::IntLiteral(value) => {
                let reg = self.alloc(&expr.span)?;
                self.load_immediate(*value, reg)?;
                Ok(reg)
            }

            ExprKind::StringLiteral(text) => {
                let label = self.string_label(text);
                let reg = self.alloc(&expr.span)?;
                self.emit(AsmInst::Lea(Operand::Global(label), reg))?;
                Ok(reg)
            }

            ExprKind::Variable(var) => {
                let src = self.var_operand(var, &expr.span)?;
                let reg = self.alloc(&expr.span)?;
                if var.ty.is_array() {
                    self.emit(AsmInst::Lea(src, reg))?;
                } else {
                    self.load(src, &var.ty, reg)?;
                }
                Ok(reg)
            }

            ExprKind::Assign { target, value } => {
                let reg = self.generate_expression(value)?;
                let dst = self.var_operand(target, &expr.span)?;
                self.store(reg, dst, &target.ty)?;
                Ok(reg)
            }

            ExprKind::Binary { op, left, right } if op.is_logical() => {
                self.generate_logical(*op, left, right)
            }

            ExprKind::Binary { op, left, right } => self.generate_binary(*op, left, right, expr),

            ExprKind::AddressOf(operand) => self.generate_address(operand),

            ExprKind::Deref(pointer) => {
                let reg = self.generate_expression(pointer)?;
                self.load_through(reg, &expr.ty)?;
                Ok(reg)
            }

            ExprKind::Subscript { array, index } => {
                let reg = self.generate_element_address(array, index, &expr.ty)?;
                self.load_through(reg, &expr.ty)?;
                Ok(reg)
            }

            ExprKind::Call { callee, args } => self.generate_call(*callee, args, &expr.span),

            ExprKind::Conversion(inner) => {
                let reg = self.generate_expression(inner)?;
                if expr.ty.is_integer() {
                    self.extend(reg, &expr.ty)?;
                }
                Ok(reg)
            }
        }
    }

    fn load_immediate(&mut self, value: i64, reg: Reg) -> Result<(), CompilerError> {
        if fits_in_imm32(value) {
            self.emit(AsmInst::Mov(Operand::Imm(value), reg.into()))
        } else {
            self.emit(AsmInst::MovAbs(value, reg))
        }
    }

    /// Re-extend the low bits of `reg` so it holds a canonical `ty` value
    pub(crate) fn extend(&mut self, reg: Reg, ty: &Type) -> Result<(), CompilerError> {
        let width = Width::from_size(ty.size());
        let inst = match (width, ty.is_signed()) {
            (Width::Quad, _) => return Ok(()),
            (Width::Long, false) => {
                AsmInst::Mov(Operand::SubReg(reg, Width::Long), Operand::SubReg(reg, Width::Long))
            }
            (width, true) => AsmInst::MovSx(width, Operand::SubReg(reg, width), reg),
            (width, false) => AsmInst::MovZx(width, Operand::SubReg(reg, width), reg),
        };
        self.emit(inst)
    }

    /// Replace the address in `reg` with the `ty` value it points at. An
    /// array is its own address, so nothing is loaded.
    fn load_through(&mut self, reg: Reg, ty: &Type) -> Result<(), CompilerError> {
        if ty.is_array() {
            return Ok(());
        }
        self.load(Operand::Indirect(reg), ty, reg)
    }

    fn scale(&mut self, reg: Reg, size: u64) -> Result<(), CompilerError> {
        if size > 1 {
            self.emit(AsmInst::Imul(Operand::Imm(size as i64), reg))?;
        }
        Ok(())
    }

    fn generate_address(&mut self, operand: &Expr) -> Result<Reg, CompilerError> {
        match &operand.kind {
            ExprKind::Variable(var) => {
                let src = self.var_operand(var, &operand.span)?;
                let reg = self.alloc(&operand.span)?;
                self.emit(AsmInst::Lea(src, reg))?;
                Ok(reg)
            }
            // the pointer value is the address
            ExprKind::Deref(pointer) => self.generate_expression(pointer),
            ExprKind::Subscript { array, index } => {
                self.generate_element_address(array, index, &operand.ty)
            }
            _ => Err(CompilerError::internal_error("address of a non-lvalue reached code generation")),
        }
    }

    /// `array + index * sizeof(element)`
    fn generate_element_address(&mut self, array: &Expr, index: &Expr, element: &Type) -> Result<Reg, CompilerError> {
        let base = self.generate_expression(array)?;
        let offset = self.generate_expression(index)?;
        self.scale(offset, element.size())?;
        self.emit(AsmInst::Add(offset.into(), base))?;
        self.free(offset, &index.span)?;
        Ok(base)
    }

    fn generate_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, expr: &Expr) -> Result<Reg, CompilerError> {
        let l = self.generate_expression(left)?;
        let r = self.generate_expression(right)?;

        if let Some(cond) = condition_code(op, &left.ty) {
            let low = Operand::SubReg(l, Width::Byte);
            self.emit(AsmInst::Cmp(r.into(), l.into()))?;
            self.emit(AsmInst::Set(cond, low.clone()))?;
            self.emit(AsmInst::MovZx(Width::Byte, low, l))?;
            self.free(r, &right.span)?;
            return Ok(l);
        }

        let pointer_difference =
            left.source_type().decay().is_pointer() && right.source_type().decay().is_pointer();
        if expr.ty.is_pointer() {
            // scale whichever side started out as an integer
            let element = expr.ty.base_type().map_or(1, Type::size);
            if left.source_type().is_integer() {
                self.scale(l, element)?;
            } else {
                self.scale(r, element)?;
            }
        }

        match op {
            BinaryOp::Add => self.emit(AsmInst::Add(r.into(), l))?,
            BinaryOp::Sub => self.emit(AsmInst::Sub(r.into(), l))?,
            BinaryOp::Mul => self.emit(AsmInst::Imul(r.into(), l))?,
            BinaryOp::Div => self.divide(l, r, expr.ty.is_signed())?,
            _ => {
                return Err(CompilerError::internal_error(format!(
                    "operator {op} has no arithmetic lowering"
                )))
            }
        }
        self.free(r, &right.span)?;

        if pointer_difference {
            let element = left.ty.base_type().map_or(1, Type::size);
            if element > 1 {
                self.emit(AsmInst::Mov(Operand::Imm(element as i64), Reg::Rcx.into()))?;
                self.divide(l, Reg::Rcx, true)?;
            }
        } else {
            self.extend(l, &expr.ty)?;
        }
        Ok(l)
    }

    /// `dividend /= divisor`, leaving the quotient in `dividend`
    fn divide(&mut self, dividend: Reg, divisor: Reg, signed: bool) -> Result<(), CompilerError> {
        self.emit(AsmInst::Mov(dividend.into(), Reg::Rax.into()))?;
        if signed {
            self.emit(AsmInst::Cqo)?;
            self.emit(AsmInst::Idiv(divisor))?;
        } else {
            let edx = Operand::SubReg(Reg::Rdx, Width::Long);
            self.emit(AsmInst::Xor(edx.clone(), edx))?;
            self.emit(AsmInst::Div(divisor))?;
        }
        self.emit(AsmInst::Mov(Reg::Rax.into(), dividend.into()))
    }

    /// Short-circuit `&&` / `||` producing 0 or 1
    fn generate_logical(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Reg, CompilerError> {
        // `&&` gives up on the first zero, `||` on the first non-zero
        let (short_cond, short_value) = match op {
            BinaryOp::LogicalAnd => (Cond::E, 0),
            _ => (Cond::Ne, 1),
        };
        let short_label = self.labels.new_label();
        let end_label = self.labels.new_label();

        let l = self.generate_expression(left)?;
        self.emit(AsmInst::Cmp(Operand::Imm(0), l.into()))?;
        self.free(l, &left.span)?;
        self.emit(AsmInst::Jump(short_cond, short_label.clone()))?;

        let r = self.generate_expression(right)?;
        self.emit(AsmInst::Cmp(Operand::Imm(0), r.into()))?;
        self.emit(AsmInst::Jump(short_cond, short_label.clone()))?;
        self.emit(AsmInst::Mov(Operand::Imm(1 - short_value), r.into()))?;
        self.emit(AsmInst::Jmp(end_label.clone()))?;
        self.emit(AsmInst::Label(short_label))?;
        self.emit(AsmInst::Mov(Operand::Imm(short_value), r.into()))?;
        self.emit(AsmInst::Label(end_label))?;
        Ok(r)
    }
}
