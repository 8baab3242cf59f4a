//! Sequential execution of steps against one state bag.
//!
//! A [`Runner`] owns the steps of one run and walks them in declaration
//! order. The first step-fatal failure aborts the run; soft steps record
//! their failures in the bag and let the run continue. Once the run reaches a
//! terminal state, cleanup operations of every successful step run in reverse
//! order.
//!
//! ```text
//! NotStarted -> Running { cursor } -> Completed
//!                                  \-> Aborted { step }
//! ```

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::RunError;
use crate::state::StateBag;
use crate::step::{Step, StepStatus};

/// Progress of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No step has executed yet.
    NotStarted,
    /// The step at `cursor` is executing.
    Running {
        /// Zero-based index of the current step.
        cursor: usize,
    },
    /// Every step finished without a step-fatal failure.
    Completed,
    /// The step at `step` failed and the remaining steps were skipped.
    Aborted {
        /// Zero-based index of the failing step.
        step: usize,
    },
}

impl RunState {
    /// Returns whether the run can no longer make progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted { .. })
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::Running { cursor } => write!(f, "running step {cursor}"),
            Self::Completed => f.write_str("completed"),
            Self::Aborted { step } => write!(f, "aborted at step {step}"),
        }
    }
}

/// Counts reported by a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps that executed, including soft failures.
    pub executed: usize,
    /// Soft steps whose failure was recorded in the bag.
    pub soft_failures: usize,
}

/// Executes an ordered list of steps exactly once.
#[derive(Debug)]
pub struct Runner<C> {
    steps: Vec<Step<C>>,
    state: RunState,
}

impl<C> Runner<C> {
    /// Creates a runner for `steps`.
    #[must_use]
    pub const fn new(steps: Vec<Step<C>>) -> Self {
        Self {
            steps,
            state: RunState::NotStarted,
        }
    }

    /// Returns the current run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Returns the steps this runner executes.
    #[must_use]
    pub fn steps(&self) -> &[Step<C>] {
        &self.steps
    }

    /// Executes every step in order against `bag`.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Step` carrying the first step-fatal failure, or
    /// `RunError::NotRestartable` when the runner has already been used.
    pub fn run(&mut self, bag: &StateBag<C>) -> Result<RunSummary, RunError> {
        if self.state != RunState::NotStarted {
            return Err(RunError::NotRestartable { state: self.state });
        }

        info!(steps = self.steps.len(), "starting run");
        let mut stored = Vec::with_capacity(self.steps.len());
        let mut passed = 0;
        let mut soft_failures = 0;
        let mut failure = None;

        for (index, step) in self.steps.iter().enumerate() {
            self.state = RunState::Running { cursor: index };
            debug!(step = %step.name(), index, "executing step");

            match step.execute(bag) {
                Ok(StepStatus::Passed) => passed += 1,
                Ok(StepStatus::Stored(value)) => {
                    passed += 1;
                    stored.push((step, value));
                }
                Ok(StepStatus::SoftFailed) => soft_failures += 1,
                Err(error) => {
                    warn!(step = %step.name(), index, %error, "step failed; aborting run");
                    self.state = RunState::Aborted { step: index };
                    failure = Some(error);
                    break;
                }
            }
        }

        if failure.is_none() {
            self.state = RunState::Completed;
        }

        for (step, value) in stored.iter().rev() {
            step.cleanup(bag, value);
        }

        info!(state = %self.state, errors = bag.error_count(), "run finished");
        match failure {
            Some(error) => Err(RunError::Step(error)),
            None => Ok(RunSummary {
                executed: passed + soft_failures,
                soft_failures,
            }),
        }
    }
}
