// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use log::{debug, trace};
use std::fmt;
use std::ops::Index;

use crate::decode::{Instruction, OpCode, ParamMode};
use crate::io::{IoBoundary, QueueIo};
use crate::mmu::Memory;
use crate::trace::{Trace, TracedInstr};
use crate::{ExecError, State};

/// An Intcode virtual machine, bound to an [`IoBoundary`] of type `I`
///
/// The executor owns its memory, instruction pointer, and relative base. Everything it reads or
/// writes outside of its own memory goes through `I`.
#[derive(Clone)]
pub struct Executor<I> {
    ip: i64,
    rel_base: i64,
    memory: Memory,
    io: I,
    state: State,
    poisoned: bool,
    pub(crate) trace: Option<Trace>,
}

// ignore the io and trace fields
impl<I> PartialEq for Executor<I> {
    fn eq(&self, other: &Self) -> bool {
        self.ip == other.ip
            && self.rel_base == other.rel_base
            && self.state == other.state
            && self.poisoned == other.poisoned
            && self.memory == other.memory
    }
}

impl<I: fmt::Debug> fmt::Debug for Executor<I> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Executor")
            .field("memory", &self.memory)
            .field("rb", &self.rel_base)
            .field("ip", &self.ip)
            .field("state", &self.state)
            .field("poisoned", &self.poisoned)
            .field("io", &self.io)
            .finish_non_exhaustive()
    }
}

/// Read-only access to memory
///
/// # Panics
///
/// Panics if `address` is negative
impl<I> Index<i64> for Executor<I> {
    type Output = i64;

    fn index(&self, address: i64) -> &Self::Output {
        self.memory.index(address)
    }
}

impl<I> Executor<I> {
    /// Create a new executor. Collects `program` into the starting memory state, with the
    /// instruction pointer and relative base both at `0`.
    pub fn new(program: impl IntoIterator<Item = i64>, io: I) -> Self {
        Self {
            ip: 0,
            rel_base: 0,
            memory: program.into_iter().collect(),
            io,
            state: State::Running,
            poisoned: false,
            trace: None,
        }
    }

    /// Address of the next instruction to execute
    pub fn ip(&self) -> i64 {
        self.ip
    }

    /// Current relative base
    pub fn relative_base(&self) -> i64 {
        self.rel_base
    }

    /// The state the executor was left in by the most recent [`step`] or [`run`]
    ///
    /// [`step`]: Executor::step
    /// [`run`]: Executor::run
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether an earlier error stopped the executor for good
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// The executor's memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable access to the executor's memory, for patching a program before running it
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// The I/O boundary
    pub fn io(&self) -> &I {
        &self.io
    }

    /// Mutable access to the I/O boundary, to supply input or collect output between runs
    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    /// Break the executor apart into its memory and I/O boundary
    pub fn into_parts(self) -> (Memory, I) {
        (self.memory, self.io)
    }

    fn record(&mut self, word: i64, instruction: Instruction, resolved_params: &[(i64, i64)]) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(TracedInstr::build(
                word,
                self.ip,
                self.rel_base,
                instruction,
                resolved_params,
            ));
        }
    }

    /// The raw parameter `offset` cells after the instruction pointer.
    ///
    /// Past `i64::MAX`, the address wraps negative and the read fails with
    /// [`InvalidAddress`](crate::InvalidAddress).
    fn raw_param(&self, offset: i64) -> Result<i64, ExecError> {
        Ok(self.memory.read(self.ip.wrapping_add(offset))?)
    }

    /// Move the instruction pointer past the current instruction. Wraps like [`Self::raw_param`],
    /// so running off the end of the address space fails on the next fetch.
    fn advance(&mut self, opcode: OpCode) {
        self.ip = self.ip.wrapping_add(opcode.width());
    }

    /// Processes the parameter `offset` cells after the instruction pointer into a concrete value
    /// using the method appropriate for `mode`.
    fn resolve_param(&self, mode: ParamMode, offset: i64) -> Result<i64, ExecError> {
        let raw = self.raw_param(offset)?;
        Ok(match mode {
            ParamMode::Positional => self.memory.read(raw)?,
            ParamMode::Immediate => raw,
            ParamMode::Relative => self.memory.read(raw.wrapping_add(self.rel_base))?,
        })
    }

    /// Turns the parameter `offset` cells after the instruction pointer into a destination
    /// address according to `mode`.
    fn resolve_dest(&self, word: i64, mode: ParamMode, offset: i64) -> Result<i64, ExecError> {
        let raw = self.raw_param(offset)?;
        match mode {
            ParamMode::Positional => Ok(raw),
            ParamMode::Relative => Ok(raw.wrapping_add(self.rel_base)),
            ParamMode::Immediate => Err(ExecError::InvalidWriteMode {
                ip: self.ip,
                word,
                param: raw,
            }),
        }
    }

    /// common logic of all 4 instructions that take 3 parameters
    fn op3(
        &mut self,
        word: i64,
        instruction: Instruction,
        operation: impl Fn(i64, i64) -> i64,
    ) -> Result<State, ExecError> {
        let modes = instruction.modes;
        let raw = [self.raw_param(1)?, self.raw_param(2)?, self.raw_param(3)?];
        let a = self.resolve_param(modes[0], 1)?;
        let b = self.resolve_param(modes[1], 2)?;
        let dest = self.resolve_dest(word, modes[2], 3)?;
        let val = operation(a, b);
        self.memory.write(dest, val)?;
        self.record(word, instruction, &[(raw[0], a), (raw[1], b), (raw[2], val)]);
        self.advance(instruction.opcode);
        Ok(State::Running)
    }

    fn jump(
        &mut self,
        word: i64,
        instruction: Instruction,
        func: impl Fn(i64) -> bool,
    ) -> Result<State, ExecError> {
        let modes = instruction.modes;
        let expr = self.resolve_param(modes[0], 1)?;
        let dest = self.resolve_param(modes[1], 2)?;
        let taken = func(expr);
        if taken && dest < 0 {
            return Err(crate::InvalidAddress(dest).into());
        }
        self.record(
            word,
            instruction,
            &[(self.raw_param(1)?, expr), (self.raw_param(2)?, dest)],
        );
        if taken {
            self.ip = dest;
        } else {
            self.advance(instruction.opcode);
        }
        Ok(State::Running)
    }
}

impl<I: IoBoundary> Executor<I> {
    /// Decode and execute the instruction at the instruction pointer.
    ///
    /// On error, no state besides memory written by the failing instruction has changed.
    fn exec_instruction(&mut self) -> Result<State, ExecError> {
        let word = self.memory.read(self.ip)?;
        let instruction =
            Instruction::from_word(word).map_err(|e| ExecError::decoding(e, self.ip))?;
        let modes = instruction.modes;

        trace!(
            "ip: {:>8} | rb: {:>5} | {word:05} [{}]",
            self.ip,
            self.rel_base,
            instruction.opcode.name()
        );

        match instruction.opcode {
            OpCode::Add => self.op3(word, instruction, i64::wrapping_add),
            OpCode::Mul => self.op3(word, instruction, i64::wrapping_mul),
            OpCode::Lt => self.op3(word, instruction, |a, b| i64::from(a < b)),
            OpCode::Eq => self.op3(word, instruction, |a, b| i64::from(a == b)),
            OpCode::Jnz => self.jump(word, instruction, |v| v != 0),
            OpCode::Jz => self.jump(word, instruction, |v| v == 0),
            OpCode::In => {
                if !self.io.input_available() {
                    return Ok(State::AwaitingInput);
                }
                let raw = self.raw_param(1)?;
                let dest = self.resolve_dest(word, modes[0], 1)?;
                // don't consume input that can't be stored
                if dest < 0 {
                    return Err(crate::InvalidAddress(dest).into());
                }
                let input = self.io.next_input();
                self.memory.write(dest, input)?;
                self.record(word, instruction, &[(raw, input)]);
                self.advance(instruction.opcode);
                Ok(State::Running)
            }
            OpCode::Out => {
                let val = self.resolve_param(modes[0], 1)?;
                self.record(word, instruction, &[(self.raw_param(1)?, val)]);
                self.io.emit(val);
                self.advance(instruction.opcode);
                Ok(State::Running)
            }
            OpCode::Rbo => {
                let val = self.resolve_param(modes[0], 1)?;
                self.record(word, instruction, &[(self.raw_param(1)?, val)]);
                self.rel_base = self.rel_base.wrapping_add(val);
                self.advance(instruction.opcode);
                Ok(State::Running)
            }
            OpCode::Halt => {
                self.record(word, instruction, &[]);
                Ok(State::Halted)
            }
        }
    }

    /// Execute a single instruction, unless the executor has halted or the host asks it to stop.
    ///
    /// Returns [`State::Running`] if another instruction can be executed straight away.
    ///
    /// On error, the executor is poisoned, and every later call returns [`ExecError::Poisoned`].
    pub fn step(&mut self) -> Result<State, ExecError> {
        if self.poisoned {
            return Err(ExecError::Poisoned);
        }
        if self.state == State::Halted {
            return Ok(State::Halted);
        }
        if self.io.should_stop() {
            debug!("host stopped execution at ip {}", self.ip);
            self.state = State::StoppedByHost;
            return Ok(State::StoppedByHost);
        }
        match self.exec_instruction() {
            Ok(state) => {
                match state {
                    State::Running => (),
                    State::AwaitingInput => debug!("awaiting input at ip {}", self.ip),
                    State::Halted => debug!("halted at ip {}", self.ip),
                    State::StoppedByHost => unreachable!("only returned by the host check"),
                }
                self.state = state;
                Ok(state)
            }
            Err(err) => {
                debug!("execution failed at ip {}: {err}", self.ip);
                self.poisoned = true;
                Err(err)
            }
        }
    }

    /// Execute until the program halts, needs input that isn't available, or the host asks it to
    /// stop, returning the [`State`] it stopped in.
    ///
    /// Once halted, further calls return [`State::Halted`] without doing anything.
    ///
    /// On error, it will return an [`ExecError`] that reflects the error, and the executor is
    /// poisoned.
    pub fn run(&mut self) -> Result<State, ExecError> {
        loop {
            match self.step()? {
                State::Running => (),
                stopped => break Ok(stopped),
            }
        }
    }

    /// Pre-compute as much as possible - that is, run every instruction up to, but not
    /// including, the first `IN`, `OUT`, or `HALT` instruction, bubbling up any errors that occur.
    pub fn precompute(&mut self) -> Result<(), ExecError> {
        while self
            .memory
            .read(self.ip)
            .ok()
            .and_then(|word| Instruction::from_word(word).ok())
            .is_some_and(|i| !matches!(i.opcode, OpCode::In | OpCode::Out | OpCode::Halt))
        {
            if self.step()? != State::Running {
                break;
            }
        }
        Ok(())
    }
}

impl Executor<QueueIo> {
    /// Queue `inputs` and run until the program halts or runs out of input.
    /// Returns `Ok((v, s))`, where `v` is a [`Vec<i64>`] containing all outputs that were
    /// waiting once it stopped, and `s` is the [`State`] at the time it stopped.
    ///
    /// On error, it will return an [`ExecError`] that reflects the error.
    pub fn run_through_inputs(
        &mut self,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Result<(Vec<i64>, State), ExecError> {
        self.io.extend(inputs);
        let state = self.run()?;
        Ok((self.io.take_outputs(), state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvalidAddress;
    use std::iter::empty;

    fn queue_exec(program: impl IntoIterator<Item = i64>) -> Executor<QueueIo> {
        Executor::new(program, QueueIo::new())
    }

    /// Example program from day 9, which takes no input and outputs its own code
    #[test]
    fn quine() {
        let quine_code = vec![
            109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
        ];
        let mut exec = queue_exec(quine_code.clone());
        let (outputs, State::Halted) = exec.run_through_inputs(empty()).unwrap() else {
            panic!("Did not halt");
        };
        assert_eq!(quine_code, outputs);
    }

    /// Example program from day 9, which "should output a 16-digit number"
    #[test]
    fn output_sixteen_digit() {
        let mut exec = queue_exec([1102, 34915192, 34915192, 7, 4, 7, 99, 0]);
        let (outputs, State::Halted) = exec.run_through_inputs(empty()).unwrap() else {
            panic!("Did not halt");
        };
        assert_eq!(outputs, vec![1_219_070_632_396_864]);
    }

    /// Ensure that suspending due to missing input leaves the executor in a sane state that can
    /// be resumed
    #[test]
    fn missing_input_recoverable() {
        let mut exec = queue_exec(vec![3, 10, 4, 10, 99]);
        let old_state = exec.clone();

        assert_eq!(exec.run(), Ok(State::AwaitingInput));
        assert_eq!(exec.ip(), 0);
        assert_eq!(exec.memory(), old_state.memory());

        assert_eq!(
            exec.run_through_inputs(vec![1, 2]),
            Ok((vec![1], State::Halted))
        );
        // only the one input was consumed
        assert_eq!(exec.io().pending_inputs(), 1);
    }

    #[test]
    fn halted_is_idempotent() {
        let mut exec = queue_exec([1, 0, 0, 0, 99]);
        assert_eq!(exec.run(), Ok(State::Halted));
        let snapshot = exec.clone();
        assert_eq!(exec.run(), Ok(State::Halted));
        assert_eq!(exec.step(), Ok(State::Halted));
        assert_eq!(exec, snapshot);
        assert_eq!(exec[0], 2);
    }

    #[test]
    fn step_reports_running() {
        let mut exec = queue_exec([1101, 1, 2, 5, 99, 0]);
        assert_eq!(exec.step(), Ok(State::Running));
        assert_eq!(exec.ip(), 4);
        assert_eq!(exec[5], 3);
        assert_eq!(exec.step(), Ok(State::Halted));
    }

    #[test]
    fn write_to_immediate_poisons() {
        let mut exec = queue_exec([11101, 1, 2, 5, 99]);
        assert_eq!(
            exec.run(),
            Err(ExecError::InvalidWriteMode {
                ip: 0,
                word: 11101,
                param: 5
            })
        );
        assert!(exec.is_poisoned());
        assert_eq!(exec.run(), Err(ExecError::Poisoned));
    }

    #[test]
    fn negative_addresses() {
        assert_eq!(
            queue_exec([4, -3, 99]).run(),
            Err(ExecError::InvalidAddress(InvalidAddress(-3)))
        );
        assert_eq!(
            queue_exec([109, -10, 22201, 0, 0, 0, 99]).run(),
            Err(ExecError::InvalidAddress(InvalidAddress(-10)))
        );
        assert_eq!(
            queue_exec([1105, 1, -4]).run(),
            Err(ExecError::InvalidAddress(InvalidAddress(-4)))
        );
    }

    #[test]
    fn end_of_address_space() {
        // store an ADD at i64::MAX and jump to it, so its parameters would lie past the end
        assert_eq!(
            queue_exec([1101, 1, 0, i64::MAX, 1105, 1, i64::MAX]).run(),
            Err(ExecError::InvalidAddress(InvalidAddress(i64::MIN)))
        );
        // an `OUT` in the last two cells runs, then the next fetch fails
        let mut exec = queue_exec([1101, 104, 0, i64::MAX - 1, 1105, 1, i64::MAX - 1]);
        exec.memory_mut().write(i64::MAX, 7).unwrap();
        assert_eq!(
            exec.run(),
            Err(ExecError::InvalidAddress(InvalidAddress(i64::MIN)))
        );
        assert_eq!(exec.io().outputs(), &[7]);
        // a `HALT` in the very last cell is fine
        let mut exec = queue_exec([1101, 99, 0, i64::MAX, 1105, 1, i64::MAX]);
        assert_eq!(exec.run(), Ok(State::Halted));
        assert_eq!(exec.ip(), i64::MAX);
    }

    #[test]
    fn unknown_mode() {
        assert_eq!(
            queue_exec([1101, 0, 0, 0, 399]).run(),
            Err(ExecError::UnknownMode {
                ip: 4,
                word: 399,
                mode: 3
            })
        );
    }

    #[test]
    fn relative_writes() {
        // set rb to 20, read input into rb+1, output it back through rb+1
        let mut exec = queue_exec([109, 20, 203, 1, 204, 1, 99]);
        assert_eq!(exec.run_through_inputs([77]), Ok((vec![77], State::Halted)));
        assert_eq!(exec.relative_base(), 20);
        assert_eq!(exec[21], 77);
    }

    #[test]
    fn precompute_stops_before_io() {
        let mut exec = queue_exec([1101, 2, 3, 11, 1002, 11, 2, 11, 4, 11, 99, 0]);
        exec.precompute().unwrap();
        assert_eq!(exec.ip(), 8);
        assert_eq!(exec[11], 10);
        assert!(exec.io().outputs().is_empty());
        assert_eq!(exec.run_through_inputs(empty()), Ok((vec![10], State::Halted)));
    }

    #[test]
    fn borrowed_boundary() {
        let mut io = QueueIo::with_inputs([5]);
        let mut exec = Executor::new([3, 0, 4, 0, 99], &mut io);
        assert_eq!(exec.run(), Ok(State::Halted));
        drop(exec);
        assert_eq!(io.outputs(), &[5]);
    }
}
