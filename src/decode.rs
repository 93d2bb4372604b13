// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Splitting instruction words into opcodes and parameter modes

use std::fmt::{self, Display};
use thiserror::Error;

/// Parameter mode for Intcode instruction
///
/// Intcode instruction parameters each have a mode:  [positional], [immediate], or [relative].
///
/// When executing an intcode instruction, the instruction's parameters are interpreted in
/// accordance with their associated modes.
///
/// [positional]: ParamMode::Positional
/// [immediate]: ParamMode::Immediate
/// [relative]: ParamMode::Relative
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ParamMode {
    /// Positional Mode
    ///
    /// A parameter in positional mode evaluates to the value at the address specified by the
    /// parameter.
    Positional = 0,
    /// Immediate Mode
    ///
    /// A parameter in immediate mode evaluates directly to the value specified. Instructions which
    /// write to memory may not use immediate mode for their destinations.
    #[doc(alias = "#")]
    Immediate = 1,
    /// Relative Mode
    ///
    /// A parameter in relative mode evaluates to the value at the address specified by the
    /// parameter, added to the relative base, which starts out as `0` but can be modified
    /// throughout the program's execution.
    #[doc(alias = "@")]
    Relative = 2,
}

impl Display for ParamMode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMode::Positional => Ok(()),
            ParamMode::Immediate => write!(fmt, "#"),
            ParamMode::Relative => write!(fmt, "@"),
        }
    }
}

impl TryFrom<i64> for ParamMode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(ParamMode::Positional),
            1 => Ok(ParamMode::Immediate),
            2 => Ok(ParamMode::Relative),
            _ => Err(i),
        }
    }
}

/// An Intcode operation
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs, reason = "documented by Display and `name`")]
pub enum OpCode {
    Add = 1,
    Mul = 2,
    In = 3,
    Out = 4,
    Jnz = 5,
    Jz = 6,
    Lt = 7,
    Eq = 8,
    Rbo = 9,
    Halt = 99,
}

impl OpCode {
    /// Number of memory cells the instruction occupies, including the instruction word itself
    pub const fn width(self) -> i64 {
        match self {
            OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq => 4,
            OpCode::Jnz | OpCode::Jz => 3,
            OpCode::In | OpCode::Out | OpCode::Rbo => 2,
            OpCode::Halt => 1,
        }
    }

    /// Descriptive name of the operation
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Add => "add",
            OpCode::Mul => "multiply",
            OpCode::In => "input",
            OpCode::Out => "output",
            OpCode::Jnz => "jump-if-true",
            OpCode::Jz => "jump-if-false",
            OpCode::Lt => "less-than",
            OpCode::Eq => "equals",
            OpCode::Rbo => "adjust-relative-base",
            OpCode::Halt => "halt",
        }
    }
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            1 => Ok(OpCode::Add),
            2 => Ok(OpCode::Mul),
            3 => Ok(OpCode::In),
            4 => Ok(OpCode::Out),
            5 => Ok(OpCode::Jnz),
            6 => Ok(OpCode::Jz),
            7 => Ok(OpCode::Lt),
            8 => Ok(OpCode::Eq),
            9 => Ok(OpCode::Rbo),
            99 => Ok(OpCode::Halt),
            _ => Err(i),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpCode::Add => "ADD",
            OpCode::Mul => "MUL",
            OpCode::In => "IN",
            OpCode::Out => "OUT",
            OpCode::Jnz => "JNZ",
            OpCode::Jz => "JZ",
            OpCode::Lt => "LT",
            OpCode::Eq => "EQ",
            OpCode::Rbo => "RBO",
            OpCode::Halt => "HALT",
        })
    }
}

/// An instruction word split into its decimal fields, before any validation
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RawInstruction {
    /// The two lowest decimal digits
    pub opcode: i64,
    /// The hundreds, thousands, and ten-thousands digits, in that order
    pub modes: [i64; 3],
}

/// Split `word` into its opcode and parameter mode digits.
///
/// Given a 5 digit number, digits ABCDE are used as follows:
/// DE is the two-digit opcode,
/// C is the 1st parameter's mode,
/// B is the 2nd parameter's mode,
/// A is the 3rd parameter's mode.
///
/// Missing digits are `0`, and digits above the ten-thousands place are ignored.
///
/// ```
/// use intcode::decode::{decode, RawInstruction};
/// assert_eq!(decode(1002), RawInstruction { opcode: 2, modes: [0, 1, 0] });
/// ```
pub const fn decode(word: i64) -> RawInstruction {
    RawInstruction {
        opcode: word % 100,
        modes: [
            (word / 100) % 10,   // C (hundreds place)
            (word / 1000) % 10,  // B (thousands place)
            (word / 10000) % 10, // A (ten thousands place)
        ],
    }
}

/// Reason an instruction word could not be decoded
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum DecodeError {
    /// The low two digits are not a known opcode
    #[error("unrecognized opcode {opcode} in instruction {word}")]
    IllegalOpcode {
        /// The whole instruction word
        word: i64,
        /// The rejected opcode digits
        opcode: i64,
    },
    /// A parameter mode digit is not `0`, `1` or `2`
    #[error("unknown parameter mode {mode} in instruction {word}")]
    UnknownMode {
        /// The whole instruction word
        word: i64,
        /// The rejected mode digit
        mode: i64,
    },
}

/// A validated instruction word
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Instruction {
    /// The operation to perform
    pub opcode: OpCode,
    /// Modes of the 1st, 2nd, and 3rd parameters
    pub modes: [ParamMode; 3],
}

impl Instruction {
    /// Decode and validate `word`
    ///
    /// So `21202` would be parsed as follows:
    ///
    /// ```
    /// use intcode::decode::{Instruction, OpCode, ParamMode};
    /// assert_eq!(
    ///     Instruction::from_word(21202),
    ///     Ok(Instruction {
    ///         opcode: OpCode::Mul,
    ///         modes: [ParamMode::Relative, ParamMode::Immediate, ParamMode::Relative],
    ///     })
    /// );
    /// ```
    pub fn from_word(word: i64) -> Result<Self, DecodeError> {
        let RawInstruction { opcode, modes } = decode(word);
        let opcode =
            OpCode::try_from(opcode).map_err(|opcode| DecodeError::IllegalOpcode { word, opcode })?;
        let mut parsed = [ParamMode::Positional; 3];
        for (slot, mode) in parsed.iter_mut().zip(modes) {
            *slot = ParamMode::try_from(mode).map_err(|mode| DecodeError::UnknownMode { word, mode })?;
        }
        Ok(Self {
            opcode,
            modes: parsed,
        })
    }
}
