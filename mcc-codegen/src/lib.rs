//! Mini C Compiler - Code Generation Backend
//!
//! Lowers the typed AST produced by `mcc-frontend` straight to x86-64 GNU
//! assembler text in AT&T syntax. It includes:
//!
//! - Instruction and operand model with its textual rendering
//! - Scratch register allocation
//! - Loop label bookkeeping for `break` and `continue`
//! - The tree-walking generator itself

pub mod asm;
pub mod regalloc;
pub mod loops;
pub mod generator;

pub use asm::{AsmInst, Operand, Reg};
pub use generator::{CodeGenerator, CodegenOptions, PRINT_ROUTINE};
pub use regalloc::{RegAllocError, RegisterPool};

use mcc_common::{CompilerError, Diagnostic, Interner};
use mcc_frontend::{Frontend, TranslationUnit};
use std::io::Write;

/// Generate assembly for `unit` into `out`
pub fn generate<W: Write>(
    unit: &TranslationUnit,
    interner: &Interner,
    options: CodegenOptions,
    out: W,
) -> Result<W, CompilerError> {
    let mut generator = CodeGenerator::new(out, interner, options);
    generator.generate(unit)?;
    Ok(generator.into_inner())
}

/// Assembly text together with the warnings raised while producing it
#[derive(Debug, Clone)]
pub struct CompiledAssembly {
    pub assembly: String,
    pub warnings: Vec<Diagnostic>,
}

/// Compile source text all the way to assembly
pub fn compile_to_assembly(source: &str, filename: &str) -> Result<CompiledAssembly, CompilerError> {
    compile_with_options(source, filename, CodegenOptions::default())
}

pub fn compile_with_options(
    source: &str,
    filename: &str,
    options: CodegenOptions,
) -> Result<CompiledAssembly, CompilerError> {
    let compilation = Frontend::compile(source, filename)?;
    let buffer = generate(&compilation.unit, &compilation.interner, options, Vec::new())?;
    let assembly = String::from_utf8(buffer)
        .map_err(|err| CompilerError::internal_error(format!("generated assembly is not UTF-8: {err}")))?;

    Ok(CompiledAssembly {
        assembly,
        warnings: compilation.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_code_generation() {
        let compiled = compile_to_assembly("int main() { return 42; }", "main.c").unwrap();

        assert!(compiled.assembly.contains("main:\n"));
        assert!(compiled.assembly.contains("\tmov $42, %r8\n"));
        assert!(compiled.assembly.contains("\tcall printf\n"));
        assert!(compiled.warnings.is_empty());
    }

    #[test]
    fn test_comments_are_optional() {
        let source = "int g; int main() { return g; }";
        let plain = compile_to_assembly(source, "c.c").unwrap();
        let commented = compile_with_options(source, "c.c", CodegenOptions { emit_comments: true }).unwrap();

        assert!(!plain.assembly.contains('#'));
        assert!(commented.assembly.contains("\t# global g: int\n"));
        assert!(commented.assembly.contains("\t# function main\n"));
    }
}
