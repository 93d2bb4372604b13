// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! The boundary between an [Executor](crate::Executor) and whatever drives it

use std::collections::VecDeque;

/// The capabilities an [Executor](crate::Executor) needs from its host.
///
/// Robots, game controllers, network nodes and the like implement this to attach their own logic
/// to a running program.
///
/// # Example
///
/// A boundary that feeds back the sum of everything output so far, stopping the program after its
/// third output:
///
/// ```
/// use intcode::prelude::*;
///
/// #[derive(Default)]
/// struct RunningTotal {
///     total: i64,
///     outputs: usize,
/// }
///
/// impl IoBoundary for RunningTotal {
///     fn next_input(&mut self) -> i64 {
///         self.total
///     }
///     fn input_available(&self) -> bool {
///         true
///     }
///     fn emit(&mut self, value: i64) {
///         self.total += value;
///         self.outputs += 1;
///     }
///     fn should_stop(&self) -> bool {
///         self.outputs == 3
///     }
/// }
///
/// // read into 11, output 11 + 1, repeat
/// let program = [3, 11, 1001, 11, 1, 11, 4, 11, 1105, 1, 0, 0];
/// let mut exec = Executor::new(program, RunningTotal::default());
/// assert_eq!(exec.run(), Ok(State::StoppedByHost));
/// assert_eq!(exec.io().total, 1 + 2 + 4);
/// ```
pub trait IoBoundary {
    /// Produce the next input value.
    ///
    /// Only called when executing an input instruction after [`input_available`] returned `true`.
    ///
    /// [`input_available`]: IoBoundary::input_available
    fn next_input(&mut self) -> i64;

    /// Whether an input value is ready.
    ///
    /// If this returns `false` when an input instruction is reached, the executor suspends in
    /// [`State::AwaitingInput`](crate::State::AwaitingInput) without consuming anything.
    fn input_available(&self) -> bool;

    /// Accept a value from an output instruction
    fn emit(&mut self, value: i64);

    /// Checked before every instruction. Returning `true` ends the current run with
    /// [`State::StoppedByHost`](crate::State::StoppedByHost).
    fn should_stop(&self) -> bool {
        false
    }
}

impl<T: IoBoundary + ?Sized> IoBoundary for &mut T {
    fn next_input(&mut self) -> i64 {
        (**self).next_input()
    }
    fn input_available(&self) -> bool {
        (**self).input_available()
    }
    fn emit(&mut self, value: i64) {
        (**self).emit(value);
    }
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

impl<T: IoBoundary + ?Sized> IoBoundary for Box<T> {
    fn next_input(&mut self) -> i64 {
        (**self).next_input()
    }
    fn input_available(&self) -> bool {
        (**self).input_available()
    }
    fn emit(&mut self, value: i64) {
        (**self).emit(value);
    }
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

/// A FIFO input queue and a list of collected outputs
///
/// If an output limit is set, the host asks the executor to stop once that many outputs are
/// waiting to be taken.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueIo {
    inputs: VecDeque<i64>,
    outputs: Vec<i64>,
    output_limit: Option<usize>,
}

impl QueueIo {
    /// Create a new `QueueIo` with no inputs and no output limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new `QueueIo` with `inputs` queued
    pub fn with_inputs(inputs: impl IntoIterator<Item = i64>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Stop execution whenever `limit` outputs are waiting in the output list
    #[must_use]
    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = Some(limit);
        self
    }

    /// Change or remove the output limit
    pub fn set_output_limit(&mut self, limit: Option<usize>) {
        self.output_limit = limit;
    }

    /// Queue up a single input
    pub fn push_input(&mut self, value: i64) {
        self.inputs.push_back(value);
    }

    /// Number of queued inputs not yet consumed
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Outputs collected so far
    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }

    /// Take all collected outputs, leaving the output list empty
    pub fn take_outputs(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.outputs)
    }
}

impl Extend<i64> for QueueIo {
    fn extend<T: IntoIterator<Item = i64>>(&mut self, iter: T) {
        self.inputs.extend(iter);
    }
}

impl IoBoundary for QueueIo {
    fn next_input(&mut self) -> i64 {
        self.inputs
            .pop_front()
            .expect("input_available was checked before next_input")
    }

    fn input_available(&self) -> bool {
        !self.inputs.is_empty()
    }

    fn emit(&mut self, value: i64) {
        self.outputs.push(value);
    }

    fn should_stop(&self) -> bool {
        self.output_limit
            .is_some_and(|limit| self.outputs.len() >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut io = QueueIo::with_inputs([1, 2]);
        io.push_input(3);
        io.extend([4]);
        let drained: Vec<i64> = std::iter::from_fn(|| {
            io.input_available().then(|| io.next_input())
        })
        .collect();
        assert_eq!(drained, vec![1, 2, 3, 4]);
        assert_eq!(io.pending_inputs(), 0);
    }

    #[test]
    fn output_limit_counts_untaken_outputs() {
        let mut io = QueueIo::new().with_output_limit(2);
        io.emit(5);
        assert!(!io.should_stop());
        io.emit(6);
        assert!(io.should_stop());
        assert_eq!(io.take_outputs(), vec![5, 6]);
        assert!(!io.should_stop());
        io.set_output_limit(None);
        io.emit(7);
        io.emit(8);
        assert!(!io.should_stop());
    }

    #[test]
    fn boxed_dyn_boundary() {
        let mut boxed: Box<dyn IoBoundary> = Box::new(QueueIo::with_inputs([9]));
        assert!(boxed.input_available());
        assert_eq!(boxed.next_input(), 9);
        assert!(!boxed.input_available());
    }
}
