//! Code generator
//!
//! Walks the typed AST once, depth first, writing assembly as it goes.
//! Expressions leave their value in a scratch register from the
//! [`RegisterPool`]; statements leave nothing behind. Values in registers are
//! always kept as the 64-bit extension of their type, so comparisons and
//! arithmetic can work on full registers.

mod calls;
mod expressions;
mod statements;

use crate::asm::{AsmInst, Operand, Reg, Width};
use crate::loops::LoopStack;
use crate::regalloc::RegisterPool;
use log::debug;
use mcc_common::{CompilerError, Interner, LabelGenerator, Name, SourceSpan};
use mcc_frontend::ast::{Function, Initializer, Storage, TopLevelItem, TranslationUnit, Variable};
use mcc_frontend::types::Type;
use std::collections::HashSet;
use std::io::Write;

/// Label of the `printf` format used by the print runtime routine
const PRINT_FORMAT_LABEL: &str = ".Lprint_fmt";
/// Symbol of the print runtime routine
pub const PRINT_ROUTINE: &str = "print";

#[derive(Debug, Clone, Default)]
pub struct CodegenOptions {
    /// Emit `# ...` comments naming each function and global
    pub emit_comments: bool,
}

pub struct CodeGenerator<'a, W: Write> {
    out: W,
    interner: &'a Interner,
    options: CodegenOptions,
    registers: RegisterPool,
    labels: LabelGenerator,
    loops: LoopStack,
    /// Globals emitted so far
    declared_globals: HashSet<Name>,
    /// String literals as (label, text), emitted at the end
    strings: Vec<(String, String)>,
    /// 8-byte pushes currently outstanding in the function body
    pushed: usize,
    return_label: String,
}

impl<'a, W: Write> CodeGenerator<'a, W> {
    pub fn new(out: W, interner: &'a Interner, options: CodegenOptions) -> Self {
        Self {
            out,
            interner,
            options,
            registers: RegisterPool::new(),
            labels: LabelGenerator::new(),
            loops: LoopStack::new(),
            declared_globals: HashSet::new(),
            strings: Vec::new(),
            pushed: 0,
            return_label: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub(crate) fn emit(&mut self, inst: AsmInst) -> Result<(), CompilerError> {
        writeln!(self.out, "{inst}")?;
        Ok(())
    }

    fn comment(&mut self, text: String) -> Result<(), CompilerError> {
        if self.options.emit_comments {
            self.emit(AsmInst::Comment(text))?;
        }
        Ok(())
    }

    pub(crate) fn name(&self, name: Name) -> &'a str {
        self.interner.resolve(name)
    }

    pub fn is_declared_global(&self, name: Name) -> bool {
        self.declared_globals.contains(&name)
    }

    /// Where a variable lives. Globals must have been emitted already.
    pub(crate) fn var_operand(&self, var: &Variable, span: &SourceSpan) -> Result<Operand, CompilerError> {
        match var.storage {
            Storage::Global if self.is_declared_global(var.name) => {
                Ok(Operand::Global(self.name(var.name).to_string()))
            }
            Storage::Global => Err(CompilerError::codegen_error(
                format!("use of undefined global \"{}\"", self.name(var.name)),
                span.start.clone(),
            )),
            Storage::Local { offset } => Ok(Operand::Frame(offset)),
        }
    }

    /// Register a string literal for the read-only section and return its label
    pub(crate) fn string_label(&mut self, text: &str) -> String {
        let label = self.labels.new_label_with_prefix("S");
        self.strings.push((label.clone(), text.to_string()));
        label
    }

    /// Generate the whole program
    pub fn generate(&mut self, unit: &TranslationUnit) -> Result<(), CompilerError> {
        self.emit_prelude()?;

        for item in &unit.items {
            match item {
                TopLevelItem::Function(function) => self.generate_function(function)?,
                TopLevelItem::Variable(var) => self.emit_global(var)?,
            }
        }

        self.emit_rodata()?;
        self.emit(AsmInst::Directive(".section .note.GNU-stack,\"\",@progbits".to_string()))?;
        self.out.flush()?;

        debug!(
            "generated {} items, {} labels, {} string literals",
            unit.items.len(),
            self.labels.allocated(),
            self.strings.len()
        );
        Ok(())
    }

    /// Print routine: writes its argument with `printf("%ld\n")` and returns it
    fn emit_prelude(&mut self) -> Result<(), CompilerError> {
        let eax = Operand::SubReg(Reg::Rax, Width::Long);
        let prelude = [
            AsmInst::Section(".data".to_string()),
            AsmInst::Label(PRINT_FORMAT_LABEL.to_string()),
            AsmInst::Directive(".asciz \"%ld\\n\"".to_string()),
            AsmInst::Section(".text".to_string()),
            AsmInst::Label(PRINT_ROUTINE.to_string()),
            AsmInst::Push(Reg::Rbx),
            AsmInst::Mov(Reg::Rdi.into(), Reg::Rbx.into()),
            AsmInst::Mov(Reg::Rdi.into(), Reg::Rsi.into()),
            AsmInst::Lea(Operand::Global(PRINT_FORMAT_LABEL.to_string()), Reg::Rdi),
            AsmInst::Xor(eax.clone(), eax),
            AsmInst::Call("printf".to_string()),
            AsmInst::Mov(Reg::Rbx.into(), Reg::Rax.into()),
            AsmInst::Pop(Reg::Rbx),
            AsmInst::Ret,
        ];
        for inst in prelude {
            self.emit(inst)?;
        }
        Ok(())
    }

    fn emit_global(&mut self, var: &Variable) -> Result<(), CompilerError> {
        let name = self.name(var.name);
        self.comment(format!("global {name}: {}", var.ty))?;

        match &var.initializer {
            None => {
                let size = var.ty.size().checked_next_multiple_of(8).ok_or_else(|| {
                    CompilerError::codegen_error(format!("global {name} is too large"), var.span.start.clone())
                })?;
                let size = size.max(8);
                self.emit(AsmInst::Directive(format!(".comm {name}, {size}, 8")))?;
            }
            Some(initializer) => {
                let value = match initializer {
                    Initializer::Int(value) => value.to_string(),
                    Initializer::Str(text) => self.string_label(text),
                };
                self.emit(AsmInst::Section(".data".to_string()))?;
                self.emit(AsmInst::Directive(format!(".globl {name}")))?;
                self.emit(AsmInst::Directive(".align 8".to_string()))?;
                self.emit(AsmInst::Label(name.to_string()))?;
                self.emit(AsmInst::Directive(format!(".quad {value}")))?;
            }
        }

        self.declared_globals.insert(var.name);
        Ok(())
    }

    fn emit_rodata(&mut self) -> Result<(), CompilerError> {
        if self.strings.is_empty() {
            return Ok(());
        }
        self.emit(AsmInst::Section(".section .rodata".to_string()))?;
        for (label, text) in std::mem::take(&mut self.strings) {
            self.emit(AsmInst::Label(label))?;
            self.emit(AsmInst::Directive(format!(".asciz \"{}\"", escape_string(&text))))?;
        }
        Ok(())
    }

    fn generate_function(&mut self, function: &Function) -> Result<(), CompilerError> {
        let name = self.name(function.name);
        debug!("generating function {name}");
        self.comment(format!("function {name}"))?;

        self.emit(AsmInst::Section(".text".to_string()))?;
        self.emit(AsmInst::Directive(format!(".globl {name}")))?;
        self.emit(AsmInst::Label(name.to_string()))?;

        // rsp stays 8 bytes off 16-byte alignment at statement level
        let frame_size = function
            .stack_size
            .checked_next_multiple_of(16)
            .and_then(|size| i32::try_from(size).ok())
            .and_then(|size| size.checked_add(8))
            .ok_or_else(|| {
                CompilerError::codegen_error(
                    format!("stack frame of {name} is too large"),
                    function.span.start.clone(),
                )
            })?;
        self.emit(AsmInst::Push(Reg::Rbp))?;
        self.emit(AsmInst::Mov(Reg::Rsp.into(), Reg::Rbp.into()))?;
        self.emit(AsmInst::Sub(Operand::Imm(i64::from(frame_size)), Reg::Rsp))?;

        for (param, &reg) in function.params.iter().zip(Reg::ARGUMENTS.iter()) {
            let slot = self.var_operand(param, &function.span)?;
            self.store(reg, slot, &param.ty)?;
        }

        self.return_label = self.labels.new_label();
        self.pushed = 0;

        let result = self.generate_statement(&function.body)?;
        self.registers
            .free(result)
            .map_err(|err| err.at(&function.span.end))?;

        // falling off the end returns 0
        self.emit(AsmInst::Mov(Operand::Imm(0), Reg::Rax.into()))?;
        self.emit(AsmInst::Label(self.return_label.clone()))?;
        self.emit(AsmInst::Mov(Reg::Rbp.into(), Reg::Rsp.into()))?;
        self.emit(AsmInst::Pop(Reg::Rbp))?;
        self.emit(AsmInst::Ret)?;

        if !self.registers.all_free() || self.pushed != 0 {
            return Err(CompilerError::internal_error(format!(
                "registers {:?} still busy at end of function {name}",
                self.registers.busy_registers()
            )));
        }
        if self.loops.depth() != 0 {
            return Err(CompilerError::internal_error(format!(
                "{} loop contexts left open at end of function {name}",
                self.loops.depth()
            )));
        }
        Ok(())
    }

    /// Write `reg` to memory using the width of `ty`
    pub(crate) fn store(&mut self, reg: Reg, dst: Operand, ty: &Type) -> Result<(), CompilerError> {
        let src = match Width::from_size(ty.size()) {
            Width::Quad => Operand::Reg(reg),
            width => Operand::SubReg(reg, width),
        };
        self.emit(AsmInst::Mov(src, dst))
    }

    /// Read a `ty` from memory into `dst`, extending it to 64 bits
    pub(crate) fn load(&mut self, src: Operand, ty: &Type, dst: Reg) -> Result<(), CompilerError> {
        let inst = match (Width::from_size(ty.size()), ty.is_signed()) {
            (Width::Quad, _) => AsmInst::Mov(src, dst.into()),
            (Width::Long, false) => AsmInst::Mov(src, Operand::SubReg(dst, Width::Long)),
            (width, true) => AsmInst::MovSx(width, src, dst),
            (width, false) => AsmInst::MovZx(width, src, dst),
        };
        self.emit(inst)
    }
}

/// Escape text for an `.asciz` directive
fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'"' => escaped.push_str("\\\""),
            b'\\' => escaped.push_str("\\\\"),
            b'\n' => escaped.push_str("\\n"),
            b'\t' => escaped.push_str("\\t"),
            b'\r' => escaped.push_str("\\r"),
            0x20..=0x7e => escaped.push(byte as char),
            other => escaped.push_str(&format!("\\{other:03o}")),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hi"), "hi");
        assert_eq!(escape_string("a\"b\\c\n"), "a\\\"b\\\\c\\n");
        assert_eq!(escape_string("\0\x07"), "\\000\\007");
    }
}
