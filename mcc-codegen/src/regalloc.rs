//! Register Allocation
//!
//! A fixed pool of four scratch registers with one busy flag each. Every
//! expression hands its result back in exactly one register, so register
//! lifetimes follow the shape of the expression tree and no spilling is
//! needed. An expression that needs a fifth live value is rejected.

use crate::asm::Reg;
use log::trace;
use mcc_common::{CompilerError, SourceLocation};
use thiserror::Error;

/// Registers handed out by [`RegisterPool::alloc`], lowest first
pub const SCRATCH_REGISTERS: [Reg; 4] = [Reg::R8, Reg::R9, Reg::R10, Reg::R11];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegAllocError {
    #[error("expression too complex")]
    OutOfRegisters,

    #[error("double free of register {0}")]
    DoubleFree(Reg),

    #[error("{0} is not a scratch register")]
    NotScratch(Reg),
}

impl RegAllocError {
    /// Running out of registers is the program's fault; the rest are
    /// bookkeeping bugs
    pub fn at(self, location: &SourceLocation) -> CompilerError {
        match self {
            RegAllocError::OutOfRegisters => CompilerError::codegen_error(self.to_string(), location.clone()),
            RegAllocError::DoubleFree(_) | RegAllocError::NotScratch(_) => {
                CompilerError::internal_error(self.to_string())
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RegisterPool {
    busy: [bool; SCRATCH_REGISTERS.len()],
}

impl RegisterPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(reg: Reg) -> Result<usize, RegAllocError> {
        SCRATCH_REGISTERS
            .iter()
            .position(|&r| r == reg)
            .ok_or(RegAllocError::NotScratch(reg))
    }

    /// Claim the lowest free register
    pub fn alloc(&mut self) -> Result<Reg, RegAllocError> {
        let index = self
            .busy
            .iter()
            .position(|busy| !busy)
            .ok_or(RegAllocError::OutOfRegisters)?;
        self.busy[index] = true;
        let reg = SCRATCH_REGISTERS[index];
        trace!("alloc {reg}");
        Ok(reg)
    }

    /// Release a register. Passing `None` is a no-op.
    pub fn free(&mut self, reg: impl Into<Option<Reg>>) -> Result<(), RegAllocError> {
        let Some(reg) = reg.into() else {
            return Ok(());
        };
        let index = Self::index(reg)?;
        if !self.busy[index] {
            return Err(RegAllocError::DoubleFree(reg));
        }
        self.busy[index] = false;
        trace!("free {reg}");
        Ok(())
    }

    pub fn is_busy(&self, reg: Reg) -> bool {
        Self::index(reg).map(|i| self.busy[i]).unwrap_or(false)
    }

    /// Busy registers, lowest first
    pub fn busy_registers(&self) -> Vec<Reg> {
        SCRATCH_REGISTERS
            .iter()
            .zip(self.busy)
            .filter(|(_, busy)| *busy)
            .map(|(&reg, _)| reg)
            .collect()
    }

    pub fn all_free(&self) -> bool {
        self.busy.iter().all(|busy| !busy)
    }
}
