//! Call lowering
//!
//! Live scratch registers are caller-saved, so they are pushed around the
//! call. Arguments are evaluated left to right; all but the last are parked
//! on the stack until every argument is ready, then popped into the argument
//! registers. Every push is counted so the stack can be padded to a 16-byte
//! boundary at the `call`.

use super::{CodeGenerator, PRINT_ROUTINE};
use crate::asm::{AsmInst, Operand, Reg};
use log::trace;
use mcc_common::{CompilerError, SourceSpan};
use mcc_frontend::ast::{Callee, Expr};
use std::io::Write;

impl<'a, W: Write> CodeGenerator<'a, W> {
    fn push(&mut self, reg: Reg) -> Result<(), CompilerError> {
        self.pushed += 1;
        self.emit(AsmInst::Push(reg))
    }

    fn pop(&mut self, reg: Reg) -> Result<(), CompilerError> {
        self.pushed = self.pushed.checked_sub(1).ok_or_else(|| {
            CompilerError::internal_error(format!("pop of {reg} with nothing pushed"))
        })?;
        self.emit(AsmInst::Pop(reg))
    }

    pub(crate) fn generate_call(&mut self, callee: Callee, args: &[Expr], span: &SourceSpan) -> Result<Reg, CompilerError> {
        let saved = self.registers.busy_registers();
        for &reg in &saved {
            self.push(reg)?;
        }

        let target = match callee {
            Callee::Print => {
                let [arg] = args else {
                    return Err(CompilerError::internal_error(format!(
                        "print takes one argument, got {}",
                        args.len()
                    )));
                };
                let reg = self.generate_expression(arg)?;
                self.emit(AsmInst::Mov(reg.into(), Reg::Rdi.into()))?;
                self.free(reg, &arg.span)?;
                self.push(Reg::Rbx)?;
                PRINT_ROUTINE
            }
            Callee::Function(name) => {
                self.load_arguments(args)?;
                self.name(name)
            }
        };

        trace!("call {target} with {} pushes outstanding", self.pushed);
        let padded = self.pushed % 2 == 0;
        if padded {
            self.emit(AsmInst::Sub(Operand::Imm(8), Reg::Rsp))?;
        }
        self.emit(AsmInst::Call(target.to_string()))?;
        if padded {
            self.emit(AsmInst::Add(Operand::Imm(8), Reg::Rsp))?;
        }

        if callee == Callee::Print {
            self.pop(Reg::Rbx)?;
        }
        for &reg in saved.iter().rev() {
            self.pop(reg)?;
        }

        let result = self.alloc(span)?;
        self.emit(AsmInst::Mov(Reg::Rax.into(), result.into()))?;
        Ok(result)
    }

    fn load_arguments(&mut self, args: &[Expr]) -> Result<(), CompilerError> {
        let Some((last, rest)) = args.split_last() else {
            return Ok(());
        };
        if args.len() > Reg::ARGUMENTS.len() {
            return Err(CompilerError::internal_error(format!(
                "call with {} arguments reached code generation",
                args.len()
            )));
        }

        for arg in rest {
            let reg = self.generate_expression(arg)?;
            self.push(reg)?;
            self.free(reg, &arg.span)?;
        }

        let reg = self.generate_expression(last)?;
        self.emit(AsmInst::Mov(reg.into(), Reg::ARGUMENTS[rest.len()].into()))?;
        self.free(reg, &last.span)?;

        for &target in Reg::ARGUMENTS[..rest.len()].iter().rev() {
            self.pop(target)?;
        }
        Ok(())
    }
}
