//! Scenario state for step runner behavioural tests.

use acctest::runner::RunState;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// A step declared by a `Given` line, built into a real step at run time.
#[derive(Debug, Clone)]
pub(crate) enum PlannedStep {
    /// Store the fake cloud's response for `key`.
    Call { key: String },
    /// Assert that `key` holds a non-empty `field`.
    AssertKeys {
        key: String,
        field: String,
        soft: bool,
    },
}

/// What the fake cloud answers for one state key.
#[derive(Debug, Clone)]
pub(crate) enum CannedResponse {
    /// A config document with the given default network.
    Config { default_network: String },
    /// A transport failure with the given message.
    Failure { message: String },
}

/// Observable result of running the planned steps.
#[derive(Debug, Clone)]
pub(crate) struct RunObservation {
    /// Executed step count, or the error message of an aborted run.
    pub(crate) outcome: Result<usize, String>,
    /// Runner state after the run.
    pub(crate) state: RunState,
    /// Keys left in the bag.
    pub(crate) keys: Vec<String>,
    /// Accumulated error messages in append order.
    pub(crate) accumulated: Vec<String>,
}

#[derive(Default, ScenarioState)]
pub(crate) struct StepRunnerState {
    pub(crate) plan: Slot<Vec<PlannedStep>>,
    pub(crate) responses: Slot<Vec<(String, CannedResponse)>>,
    pub(crate) observation: Slot<RunObservation>,
}

#[fixture]
pub(crate) fn step_runner_state() -> StepRunnerState {
    let state = StepRunnerState::default();
    state.plan.set(Vec::new());
    state.responses.set(Vec::new());
    state
}
