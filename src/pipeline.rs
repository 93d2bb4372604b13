// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Chains of executors, each feeding its output into the next one's input
//!
//! This covers the amplifier arrangements from [Day 7]: a straight series, and a feedback loop
//! in which the last stage's output goes back into the first.
//!
//! [Day 7]: https://adventofcode.com/2019/day/7

use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::{ExecError, Executor, QueueIo, State};

/// Reason a [Pipeline] couldn't produce a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A stage failed
    #[error("stage {stage} failed: {source}")]
    Exec {
        /// Index of the failing stage
        stage: usize,
        /// What went wrong
        source: ExecError,
    },
    /// The pipeline has no stages
    #[error("pipeline has no stages")]
    NoStages,
    /// Every stage halted, but the final stage never produced output
    #[error("final stage halted without output")]
    NoOutput,
    /// A full round made no progress, with some stages still waiting for input
    #[error("every unhalted stage is waiting for input that will never come")]
    Stalled,
}

/// A series of executors running the same program, joined output to input
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Executor<QueueIo>>,
    feedback: bool,
}

impl Pipeline {
    /// Create a stage for each phase setting, with that setting queued as its first input
    pub fn new(program: &[i64], phases: impl IntoIterator<Item = i64>) -> Self {
        Self {
            stages: phases
                .into_iter()
                .map(|phase| Executor::new(program.iter().copied(), QueueIo::with_inputs([phase])))
                .collect(),
            feedback: false,
        }
    }

    /// Route the final stage's output back into the first stage
    #[must_use]
    pub fn with_feedback(mut self, feedback: bool) -> Self {
        self.feedback = feedback;
        self
    }

    /// The stages, in order
    pub fn stages(&self) -> &[Executor<QueueIo>] {
        &self.stages
    }

    /// Send `signal` into the first stage and run every stage in turn, each until it blocks,
    /// until all of them have halted. Returns the last value output by the final stage.
    pub fn run(&mut self, signal: i64) -> Result<i64, PipelineError> {
        let count = self.stages.len();
        if count == 0 {
            return Err(PipelineError::NoStages);
        }
        self.stages[0].io_mut().push_input(signal);

        let mut last = None;
        for round in 0.. {
            let mut progressed = false;
            for stage in 0..count {
                let exec = &mut self.stages[stage];
                if exec.state() == State::Halted {
                    continue;
                }
                let ip = exec.ip();
                let pending = exec.io().pending_inputs();
                let state = exec
                    .run()
                    .map_err(|source| PipelineError::Exec { stage, source })?;
                let outputs = exec.io_mut().take_outputs();
                // a looping stage can consume and emit, then block at the same `IN` again
                progressed |= state == State::Halted
                    || exec.ip() != ip
                    || exec.io().pending_inputs() < pending
                    || !outputs.is_empty();

                if stage + 1 < count {
                    self.stages[stage + 1].io_mut().extend(outputs);
                } else {
                    last = outputs.last().copied().or(last);
                    if self.feedback {
                        self.stages[0].io_mut().extend(outputs);
                    }
                }
            }

            if self.stages.iter().all(|exec| exec.state() == State::Halted) {
                debug!("pipeline of {count} stages halted after {} rounds", round + 1);
                return last.ok_or(PipelineError::NoOutput);
            }
            if !progressed {
                return Err(PipelineError::Stalled);
            }
        }
        unreachable!("the round counter is unbounded")
    }
}

/// Try every ordering of `phases`, returning the highest signal that comes out of a pipeline fed
/// `0`
///
/// ```
/// use intcode::pipeline::max_signal;
/// let program = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];
/// assert_eq!(max_signal(&program, &[0, 1, 2, 3, 4], false), Ok(43210));
/// ```
pub fn max_signal(program: &[i64], phases: &[i64], feedback: bool) -> Result<i64, PipelineError> {
    phases
        .iter()
        .copied()
        .permutations(phases.len())
        .map(|order| Pipeline::new(program, order).with_feedback(feedback).run(0))
        .process_results(|signals| signals.max())?
        .ok_or(PipelineError::NoStages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEEDBACK_EXAMPLE: [i64; 29] = [
        3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
        1005, 28, 6, 99, 0, 0, 5,
    ];

    #[test]
    fn series() {
        let program = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];
        let mut pipeline = Pipeline::new(&program, [4, 3, 2, 1, 0]);
        assert_eq!(pipeline.run(0), Ok(43210));
        assert!(pipeline.stages().iter().all(|s| s.state() == State::Halted));
    }

    #[test]
    fn feedback_loop() {
        let mut pipeline = Pipeline::new(&FEEDBACK_EXAMPLE, [9, 8, 7, 6, 5]).with_feedback(true);
        assert_eq!(pipeline.run(0), Ok(139_629_729));
    }

    #[test]
    fn best_feedback_ordering() {
        assert_eq!(
            max_signal(&FEEDBACK_EXAMPLE, &[5, 6, 7, 8, 9], true),
            Ok(139_629_729)
        );
    }

    /// adds 1 to each input and outputs it, jumping back to the same `IN`, until it has handled
    /// the count stored at address 21
    fn looping_stage(count: i64) -> [i64; 22] {
        [
            3, 20, 1001, 20, 1, 20, 4, 20, 1001, 21, -1, 21, 1005, 21, 0, 99, 0, 0, 0, 0, 0, count,
        ]
    }

    #[test]
    fn stages_blocking_at_the_same_input() {
        // every round ends with each unhalted stage back at `IN` on address 0
        let mut pipeline = Pipeline::new(&looping_stage(6), [100, 200]).with_feedback(true);
        assert_eq!(pipeline.run(0), Ok(4));
        assert!(pipeline.stages().iter().all(|s| s.state() == State::Halted));
        assert_eq!(pipeline.stages()[0].io().pending_inputs(), 2);
    }

    #[test]
    fn open_loop_stalls() {
        // each stage needs a third input, which nothing provides without feedback
        let mut pipeline = Pipeline::new(&[3, 0, 3, 0, 3, 0, 4, 0, 99], [1, 2]);
        assert_eq!(pipeline.run(0), Err(PipelineError::Stalled));
    }

    #[test]
    fn silent_final_stage() {
        let mut pipeline = Pipeline::new(&[3, 0, 99], [1]);
        assert_eq!(pipeline.run(0), Err(PipelineError::NoOutput));
        assert_eq!(
            Pipeline::new(&[99], std::iter::empty()).run(0),
            Err(PipelineError::NoStages)
        );
    }

    #[test]
    fn stage_errors_are_attributed() {
        let mut pipeline = Pipeline::new(&[3, 0, 3, 1, 4, 0, 42], [0, 0]);
        assert!(matches!(
            pipeline.run(0),
            Err(PipelineError::Exec {
                stage: 0,
                source: ExecError::IllegalOpcode { ip: 6, .. }
            })
        ));
    }
}
