//! Assertion helpers for step runner behavioural tests.

use acctest::runner::RunState;
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{RunObservation, StepRunnerState};

fn observation(step_runner_state: &StepRunnerState) -> StepResult<RunObservation> {
    step_runner_state
        .observation
        .get()
        .ok_or_else(|| String::from("the steps should have been run"))
}

#[then("the run completes after {count} steps")]
fn run_completes(step_runner_state: &StepRunnerState, count: usize) -> StepResult<()> {
    let observed = observation(step_runner_state)?;
    match observed.outcome {
        Ok(executed) if executed == count => {}
        Ok(executed) => return Err(format!("expected {count} steps, {executed} executed")),
        Err(message) => return Err(format!("expected completion, got error: {message}")),
    }
    if observed.state == RunState::Completed {
        Ok(())
    } else {
        Err(format!("expected completed state, got {}", observed.state))
    }
}

#[then("the run fails with message {message}")]
fn run_fails(step_runner_state: &StepRunnerState, message: String) -> StepResult<()> {
    match observation(step_runner_state)?.outcome {
        Err(actual) if actual == message => Ok(()),
        Err(actual) => Err(format!("expected error '{message}', got '{actual}'")),
        Ok(executed) => Err(format!(
            "expected error '{message}', run completed after {executed} steps"
        )),
    }
}

#[then("the run state is aborted at step {index}")]
fn run_aborted_at(step_runner_state: &StepRunnerState, index: usize) -> StepResult<()> {
    let observed = observation(step_runner_state)?;
    if observed.state == (RunState::Aborted { step: index }) {
        Ok(())
    } else {
        Err(format!(
            "expected aborted at step {index}, got {}",
            observed.state
        ))
    }
}

#[then("the state holds key {key}")]
fn state_holds_key(step_runner_state: &StepRunnerState, key: String) -> StepResult<()> {
    let observed = observation(step_runner_state)?;
    if observed.keys.contains(&key) {
        Ok(())
    } else {
        Err(format!("expected key {key} in {:?}", observed.keys))
    }
}

#[then("the state does not hold key {key}")]
fn state_lacks_key(step_runner_state: &StepRunnerState, key: String) -> StepResult<()> {
    let observed = observation(step_runner_state)?;
    if observed.keys.contains(&key) {
        Err(format!("key {key} should not be stored"))
    } else {
        Ok(())
    }
}

#[then("no errors were accumulated")]
fn no_errors_accumulated(step_runner_state: &StepRunnerState) -> StepResult<()> {
    let observed = observation(step_runner_state)?;
    if observed.accumulated.is_empty() {
        Ok(())
    } else {
        Err(format!("unexpected errors: {:?}", observed.accumulated))
    }
}

#[then("the accumulated error count is {count}")]
fn accumulated_count(step_runner_state: &StepRunnerState, count: usize) -> StepResult<()> {
    let observed = observation(step_runner_state)?;
    if observed.accumulated.len() == count {
        Ok(())
    } else {
        Err(format!(
            "expected {count} accumulated errors, got {:?}",
            observed.accumulated
        ))
    }
}

#[then("accumulated error {position} reads {message}")]
fn accumulated_error_reads(
    step_runner_state: &StepRunnerState,
    position: usize,
    message: String,
) -> StepResult<()> {
    let observed = observation(step_runner_state)?;
    let actual = position
        .checked_sub(1)
        .and_then(|index| observed.accumulated.get(index))
        .ok_or_else(|| format!("no accumulated error at position {position}"))?;
    if *actual == message {
        Ok(())
    } else {
        Err(format!("expected '{message}', got '{actual}'"))
    }
}
