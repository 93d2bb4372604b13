// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD
#![warn(missing_docs)]

//! Library providing a reusable Intcode virtual machine
//!
//! The [Executor] is fully functional, with all of the [Opcodes] and [Parameter Modes] defined in
//! the completed Intcode computer for [Day 9]. Memory is sparse and grows on demand, and all
//! input and output goes through an [`IoBoundary`] supplied by the caller.
//!
//! # Example
//!
//! ```rust
//! use intcode::prelude::*;
//! let mut exec = Executor::new(vec![104, 1024, 99], QueueIo::new());
//!
//! assert_eq!(exec.run(), Ok(State::Halted));
//! assert_eq!(exec.io().outputs(), &[1024]);
//! ```
//!
//! Programs that read input suspend when none is available, and pick back up where they left off
//! once more is supplied:
//!
//! ```rust
//! use intcode::prelude::*;
//! let program: Program = "3,9,8,9,10,9,4,9,99,-1,8".parse().unwrap();
//! let mut exec = Executor::new(program, QueueIo::new());
//!
//! assert_eq!(exec.run(), Ok(State::AwaitingInput));
//! exec.io_mut().push_input(8);
//! assert_eq!(exec.run(), Ok(State::Halted));
//! assert_eq!(exec.io_mut().take_outputs(), vec![1]);
//! ```
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Parameter Modes]: https://esolangs.org/wiki/Intcode#Parameter_Modes
//! [Day 9]: https://adventofcode.com/2019/day/9

use thiserror::Error;

pub mod ascii;
pub mod decode;
mod executor;
pub mod io;
/// A module providing a sort of logical memory management unit, using a hashmap to split memory
/// into pages, which are each contiguous in memory.
pub mod mmu;
pub mod pipeline;
mod program;
pub mod search;
pub mod trace;

pub use decode::{OpCode, ParamMode};
pub use executor::Executor;
pub use io::{IoBoundary, QueueIo};
pub use mmu::{InvalidAddress, Memory};
pub use program::{ParseProgramError, Program, parse_program};

/// A small module that re-exports items needed when working with the Intcode executor
pub mod prelude {
    pub use crate::{ExecError, Executor, IoBoundary, Program, QueueIo, State};
}

/// The state of an [Executor]
///
/// [Running](State::Running) is only ever returned by [`Executor::step`], and means that the
/// next instruction can be executed straight away.
///
/// [`AwaitingInput`](State::AwaitingInput) means that the next instruction requires input, and the
/// [`IoBoundary`] had none available. The instruction pointer still points at that input
/// instruction, so running again once input is available resumes cleanly.
///
/// [Halted](State::Halted) means that a `HALT` instruction has been executed. Once it's been
/// returned, no more instructions will be executed.
///
/// [`StoppedByHost`](State::StoppedByHost) means that [`IoBoundary::should_stop`] returned `true`
/// before the next instruction. Whether running again makes progress is up to the host.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    /// More instructions can be executed
    Running,
    /// Execution is awaiting input
    AwaitingInput,
    /// Execution has halted
    Halted,
    /// The host asked for execution to stop
    StoppedByHost,
}

/// An error occurred when executing an intcode instruction
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum ExecError {
    /// A negative memory address was accessed or jumped to
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),
    /// An instruction tried to write to an immediate destination
    #[error("instruction {word} at {ip} tried to write to immediate {param}")]
    InvalidWriteMode {
        /// Address of the instruction
        ip: i64,
        /// The instruction word
        word: i64,
        /// The raw destination parameter
        param: i64,
    },
    /// An invalid opcode was encountered
    #[error("encountered unrecognized opcode {opcode} (instruction {word}) at {ip}")]
    IllegalOpcode {
        /// Address of the instruction
        ip: i64,
        /// The instruction word
        word: i64,
        /// The rejected opcode digits
        opcode: i64,
    },
    /// An unknown parameter mode was encountered
    #[error("encountered unknown parameter mode {mode} (instruction {word}) at {ip}")]
    UnknownMode {
        /// Address of the instruction
        ip: i64,
        /// The instruction word
        word: i64,
        /// The rejected mode digit
        mode: i64,
    },
    /// The executor already stopped with an error, and can't continue
    #[error("executor was poisoned by an earlier error")]
    Poisoned,
}

impl ExecError {
    pub(crate) fn decoding(err: decode::DecodeError, ip: i64) -> Self {
        match err {
            decode::DecodeError::IllegalOpcode { word, opcode } => {
                Self::IllegalOpcode { ip, word, opcode }
            }
            decode::DecodeError::UnknownMode { word, mode } => Self::UnknownMode { ip, word, mode },
        }
    }
}
