//! x86-64 Assembly Instruction Definitions
//!
//! A small model of the AT&T-syntax instructions the generator emits. Every
//! instruction renders to exactly one line of assembler input.

use std::fmt;

/// General purpose registers
///
/// R8-R11 form the scratch pool handed out by the register allocator. The
/// others have fixed roles: return value, argument passing, frame and stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    R8, R9, R10, R11,
    Rax, Rbx, Rcx, Rdx, Rsi, Rdi, Rbp, Rsp,
}

/// Operand width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
    Long,
    Quad,
}

impl Width {
    /// Width holding a value of `size` bytes
    pub fn from_size(size: u64) -> Width {
        match size {
            1 => Width::Byte,
            2 => Width::Word,
            4 => Width::Long,
            _ => Width::Quad,
        }
    }

    pub fn suffix(self) -> char {
        match self {
            Width::Byte => 'b',
            Width::Word => 'w',
            Width::Long => 'l',
            Width::Quad => 'q',
        }
    }
}

impl Reg {
    /// Registers used for the first six integer arguments, in order
    pub const ARGUMENTS: [Reg; 6] = [Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

    /// Register name without the `%` sigil at the given width
    pub fn name(self, width: Width) -> &'static str {
        use Width::*;
        match (self, width) {
            (Reg::R8, Quad) => "r8",
            (Reg::R8, Long) => "r8d",
            (Reg::R8, Word) => "r8w",
            (Reg::R8, Byte) => "r8b",
            (Reg::R9, Quad) => "r9",
            (Reg::R9, Long) => "r9d",
            (Reg::R9, Word) => "r9w",
            (Reg::R9, Byte) => "r9b",
            (Reg::R10, Quad) => "r10",
            (Reg::R10, Long) => "r10d",
            (Reg::R10, Word) => "r10w",
            (Reg::R10, Byte) => "r10b",
            (Reg::R11, Quad) => "r11",
            (Reg::R11, Long) => "r11d",
            (Reg::R11, Word) => "r11w",
            (Reg::R11, Byte) => "r11b",
            (Reg::Rax, Quad) => "rax",
            (Reg::Rax, Long) => "eax",
            (Reg::Rax, Word) => "ax",
            (Reg::Rax, Byte) => "al",
            (Reg::Rbx, Quad) => "rbx",
            (Reg::Rbx, Long) => "ebx",
            (Reg::Rbx, Word) => "bx",
            (Reg::Rbx, Byte) => "bl",
            (Reg::Rcx, Quad) => "rcx",
            (Reg::Rcx, Long) => "ecx",
            (Reg::Rcx, Word) => "cx",
            (Reg::Rcx, Byte) => "cl",
            (Reg::Rdx, Quad) => "rdx",
            (Reg::Rdx, Long) => "edx",
            (Reg::Rdx, Word) => "dx",
            (Reg::Rdx, Byte) => "dl",
            (Reg::Rsi, Quad) => "rsi",
            (Reg::Rsi, Long) => "esi",
            (Reg::Rsi, Word) => "si",
            (Reg::Rsi, Byte) => "sil",
            (Reg::Rdi, Quad) => "rdi",
            (Reg::Rdi, Long) => "edi",
            (Reg::Rdi, Word) => "di",
            (Reg::Rdi, Byte) => "dil",
            (Reg::Rbp, Quad) => "rbp",
            (Reg::Rbp, Long) => "ebp",
            (Reg::Rbp, Word) => "bp",
            (Reg::Rbp, Byte) => "bpl",
            (Reg::Rsp, Quad) => "rsp",
            (Reg::Rsp, Long) => "esp",
            (Reg::Rsp, Word) => "sp",
            (Reg::Rsp, Byte) => "spl",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.name(Width::Quad))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    /// A register viewed at a narrower width
    SubReg(Reg, Width),
    Imm(i64),
    /// RIP-relative reference to a symbol or label
    Global(String),
    /// Slot relative to the frame pointer
    Frame(i64),
    /// Memory addressed by a register
    Indirect(Reg),
}

impl From<Reg> for Operand {
    fn from(reg: Reg) -> Self {
        Operand::Reg(reg)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{reg}"),
            Operand::SubReg(reg, width) => write!(f, "%{}", reg.name(*width)),
            Operand::Imm(value) => write!(f, "${value}"),
            Operand::Global(name) => write!(f, "{name}(%rip)"),
            Operand::Frame(offset) => write!(f, "{offset}(%rbp)"),
            Operand::Indirect(reg) => write!(f, "({reg})"),
        }
    }
}

/// Condition codes for `set` and conditional jumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    E, Ne,
    // signed
    L, G, Le, Ge,
    // unsigned
    B, A, Be, Ae,
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Cond::E => "e",
            Cond::Ne => "ne",
            Cond::L => "l",
            Cond::G => "g",
            Cond::Le => "le",
            Cond::Ge => "ge",
            Cond::B => "b",
            Cond::A => "a",
            Cond::Be => "be",
            Cond::Ae => "ae",
        };
        write!(f, "{code}")
    }
}

/// x86-64 instructions and assembler directives, AT&T operand order
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // Data movement
    Mov(Operand, Operand),          // dst = src
    MovAbs(i64, Reg),               // 64-bit immediate
    MovSx(Width, Operand, Reg),     // sign-extend from width to 64 bits
    MovZx(Width, Operand, Reg),     // zero-extend from width to 64 bits
    Lea(Operand, Reg),

    // Arithmetic
    Add(Operand, Reg),
    Sub(Operand, Reg),
    Imul(Operand, Reg),
    Cqo,
    Idiv(Reg),
    Div(Reg),
    Xor(Operand, Operand),
    Cmp(Operand, Operand),
    Set(Cond, Operand),

    // Control flow
    Jmp(String),
    Jump(Cond, String),
    Push(Reg),
    Pop(Reg),
    Call(String),
    Ret,

    // Assembler pseudo-instructions
    Label(String),
    Section(String),
    Directive(String),
    Comment(String),
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::Mov(src, dst) => write!(f, "\tmov {src}, {dst}"),
            AsmInst::MovAbs(value, dst) => write!(f, "\tmovabs ${value}, {dst}"),
            AsmInst::MovSx(Width::Long, src, dst) => write!(f, "\tmovslq {src}, {dst}"),
            AsmInst::MovSx(width, src, dst) => write!(f, "\tmovs{}q {src}, {dst}", width.suffix()),
            AsmInst::MovZx(width, src, dst) => write!(f, "\tmovz{}q {src}, {dst}", width.suffix()),
            AsmInst::Lea(src, dst) => write!(f, "\tlea {src}, {dst}"),

            AsmInst::Add(src, dst) => write!(f, "\tadd {src}, {dst}"),
            AsmInst::Sub(src, dst) => write!(f, "\tsub {src}, {dst}"),
            AsmInst::Imul(src, dst) => write!(f, "\timul {src}, {dst}"),
            AsmInst::Cqo => write!(f, "\tcqo"),
            AsmInst::Idiv(reg) => write!(f, "\tidiv {reg}"),
            AsmInst::Div(reg) => write!(f, "\tdiv {reg}"),
            AsmInst::Xor(src, dst) => write!(f, "\txor {src}, {dst}"),
            AsmInst::Cmp(src, dst) => write!(f, "\tcmp {src}, {dst}"),
            AsmInst::Set(cond, dst) => write!(f, "\tset{cond} {dst}"),

            AsmInst::Jmp(label) => write!(f, "\tjmp {label}"),
            AsmInst::Jump(cond, label) => write!(f, "\tj{cond} {label}"),
            AsmInst::Push(reg) => write!(f, "\tpush {reg}"),
            AsmInst::Pop(reg) => write!(f, "\tpop {reg}"),
            AsmInst::Call(label) => write!(f, "\tcall {label}"),
            AsmInst::Ret => write!(f, "\tret"),

            AsmInst::Label(label) => write!(f, "{label}:"),
            AsmInst::Section(name) => write!(f, "\t{name}"),
            AsmInst::Directive(text) => write!(f, "\t{text}"),
            AsmInst::Comment(text) => write!(f, "\t# {text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_names() {
        assert_eq!(Reg::R8.to_string(), "%r8");
        assert_eq!(Reg::Rdi.name(Width::Byte), "dil");
        assert_eq!(Reg::R11.name(Width::Long), "r11d");
        assert_eq!(Reg::Rax.name(Width::Word), "ax");
    }

    #[test]
    fn test_operand_display() {
        assert_eq!(Operand::Imm(-3).to_string(), "$-3");
        assert_eq!(Operand::Global("counter".to_string()).to_string(), "counter(%rip)");
        assert_eq!(Operand::Frame(-16).to_string(), "-16(%rbp)");
        assert_eq!(Operand::Indirect(Reg::R9).to_string(), "(%r9)");
        assert_eq!(Operand::SubReg(Reg::R10, Width::Byte).to_string(), "%r10b");
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(AsmInst::Mov(Operand::Imm(3), Reg::R8.into()).to_string(), "\tmov $3, %r8");
        assert_eq!(
            AsmInst::MovSx(Width::Long, Operand::Frame(-8), Reg::R9).to_string(),
            "\tmovslq -8(%rbp), %r9"
        );
        assert_eq!(
            AsmInst::MovZx(Width::Byte, Operand::SubReg(Reg::R8, Width::Byte), Reg::R8).to_string(),
            "\tmovzbq %r8b, %r8"
        );
        assert_eq!(
            AsmInst::Set(Cond::Le, Operand::SubReg(Reg::R8, Width::Byte)).to_string(),
            "\tsetle %r8b"
        );
        assert_eq!(AsmInst::Jump(Cond::E, ".L3".to_string()).to_string(), "\tje .L3");
        assert_eq!(AsmInst::Label("main".to_string()).to_string(), "main:");
        assert_eq!(AsmInst::Comment("function main".to_string()).to_string(), "\t# function main");
    }
}
