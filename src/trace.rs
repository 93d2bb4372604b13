// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Opt-in recording of executed instructions
use std::fmt::{self, Display};

use crate::Executor;
use crate::decode::{Instruction, OpCode, ParamMode};

/// An executed instruction, along with the machine state it was executed in.
///
/// Converts into a one-line, human-readable description with its [Display] impl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedInstr {
    word: i64,
    instr_ptr: i64,
    rel_base: i64,
    instruction: Instruction,
    params: [(i64, i64); 3],
    arity: usize,
}

impl TracedInstr {
    /// Return the relative base at the time the traced instruction was executed
    pub fn rel_base(&self) -> i64 {
        self.rel_base
    }

    /// Return the instruction pointer's position when the traced instruction was executed
    pub fn instr_ptr(&self) -> i64 {
        self.instr_ptr
    }

    /// Return the actual integer of the traced instruction
    pub fn word(&self) -> i64 {
        self.word
    }

    /// Return the opcode of the traced instruction
    pub fn op_code(&self) -> OpCode {
        self.instruction.opcode
    }

    /// Return an array of the parameter modes of the traced instruction
    pub fn param_modes(&self) -> [ParamMode; 3] {
        self.instruction.modes
    }

    /// Each parameter as `(raw, resolved)`. For a destination, `resolved` is the value stored.
    pub fn params(&self) -> &[(i64, i64)] {
        &self.params[..self.arity]
    }

    /// If the instruction stored a value in memory, return that value
    pub fn stored_val(&self) -> Option<i64> {
        match self.instruction.opcode {
            OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq => Some(self.params[2].1),
            OpCode::In => Some(self.params[0].1),
            OpCode::Out | OpCode::Jnz | OpCode::Jz | OpCode::Rbo | OpCode::Halt => None,
        }
    }

    pub(crate) fn build(
        word: i64,
        instr_ptr: i64,
        rel_base: i64,
        instruction: Instruction,
        resolved_params: &[(i64, i64)],
    ) -> Self {
        debug_assert_eq!(
            i64::try_from(resolved_params.len()).ok(),
            Some(instruction.opcode.width() - 1)
        );
        let mut params = [(0, 0); 3];
        params[..resolved_params.len()].copy_from_slice(resolved_params);
        Self {
            word,
            instr_ptr,
            rel_base,
            instruction,
            params,
            arity: resolved_params.len(),
        }
    }

    /// Whether a conditional jump was taken, judged from its resolved condition
    fn jumped(&self) -> bool {
        match self.instruction.opcode {
            OpCode::Jnz => self.params[0].1 != 0,
            OpCode::Jz => self.params[0].1 == 0,
            _ => false,
        }
    }
}

impl<I> Executor<I> {
    /// Begin a [Trace] of executed instructions. If a trace is already running, this replaces that
    /// trace and returns it in a [`Some`], otherwise, it returns [`None`].
    ///
    /// # Example
    /// ```
    /// # use intcode::prelude::*;
    /// let mut exec = Executor::new([1101, 90, 9, 4, 0], QueueIo::new());
    /// exec.start_trace();
    /// assert_eq!(exec.run(), Ok(State::Halted));
    /// let trace = exec.end_trace().unwrap();
    /// assert_eq!(trace.0.len(), 2);
    /// assert_eq!(trace.0[0].stored_val(), Some(99));
    /// ```
    pub fn start_trace(&mut self) -> Option<Trace> {
        self.trace.replace(Trace::new())
    }

    /// Stop tracing executed instructions into a [Trace]. If no trace was active, returns [`None`]
    ///
    /// see [`Executor::start_trace`]
    pub fn end_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Get a view of the current trace
    pub fn show_trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }
}

#[derive(Debug, Default, Clone)]
/// A log of instructions that an [Executor] has executed since a call to
/// [`Executor::start_trace`]
pub struct Trace(pub Vec<TracedInstr>);

impl Trace {
    pub(crate) fn push(&mut self, instr: TracedInstr) {
        self.0.push(instr);
    }

    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }
}

impl Display for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opcode = self.op_code();
        write!(
            f,
            "ran instruction at {:0>4}: word {: <5} | [{opcode}",
            self.instr_ptr, self.word
        )?;
        let stores = self.stored_val().is_some();
        for (i, (&(raw, val), mode)) in self.params().iter().zip(self.param_modes()).enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{mode}{raw} (")?;
            match (opcode, i) {
                _ if stores && i + 1 == self.arity => write!(f, "stored {val}")?,
                (OpCode::Jnz | OpCode::Jz, 1) if self.jumped() => write!(f, "jumped to {val}")?,
                (OpCode::Jnz | OpCode::Jz, 1) => write!(f, "didn't jump to {val}")?,
                (OpCode::Rbo, _) => write!(
                    f,
                    "resolves to {val}; base {} -> {}",
                    self.rel_base,
                    self.rel_base.wrapping_add(val)
                )?,
                _ => write!(f, "resolves to {val}")?,
            }
            f.write_str(")")?;
        }
        f.write_str("]")
    }
}
