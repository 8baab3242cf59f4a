//! Given/when steps for step runner scenarios.

use std::collections::HashMap;

use acctest::runner::Runner;
use acctest::state::StateBag;
use acctest::step::Step;
use eyre::eyre;
use rstest_bdd_macros::{given, when};
use serde_json::{Value, json};

use super::StepResult;
use super::state::{CannedResponse, PlannedStep, RunObservation, StepRunnerState};

/// Network name that stands for an empty `DefaultNetwork` in feature files.
const EMPTY_NETWORK: &str = "nothing";

/// In-memory stand-in for the cloud API under test.
#[derive(Debug, Default)]
struct FakeCloud {
    responses: HashMap<String, CannedResponse>,
}

impl FakeCloud {
    fn fetch(&self, key: &str) -> eyre::Result<Value> {
        match self.responses.get(key) {
            Some(CannedResponse::Config { default_network }) => {
                Ok(json!({ "DefaultNetwork": default_network }))
            }
            Some(CannedResponse::Failure { message }) => Err(eyre!("{message}")),
            None => Err(eyre!("no response configured for {key}")),
        }
    }
}

fn push_plan(step_runner_state: &StepRunnerState, step: PlannedStep) {
    let mut plan = step_runner_state.plan.get().unwrap_or_default();
    plan.push(step);
    step_runner_state.plan.set(plan);
}

fn push_call(step_runner_state: &StepRunnerState, key: String, response: CannedResponse) {
    let mut responses = step_runner_state.responses.get().unwrap_or_default();
    responses.push((key.clone(), response));
    step_runner_state.responses.set(responses);
    push_plan(step_runner_state, PlannedStep::Call { key });
}

#[given("an API call storing {key} with DefaultNetwork {network}")]
fn given_api_call(step_runner_state: &StepRunnerState, key: String, network: String) {
    let default_network = if network == EMPTY_NETWORK {
        String::new()
    } else {
        network
    };
    push_call(
        step_runner_state,
        key,
        CannedResponse::Config { default_network },
    );
}

#[given("a failing API call for {key} with message {message}")]
fn given_failing_api_call(step_runner_state: &StepRunnerState, key: String, message: String) {
    push_call(step_runner_state, key, CannedResponse::Failure { message });
}

#[given("an assertion that {key} has field {field}")]
fn given_assertion(step_runner_state: &StepRunnerState, key: String, field: String) {
    push_plan(
        step_runner_state,
        PlannedStep::AssertKeys {
            key,
            field,
            soft: false,
        },
    );
}

#[given("a soft assertion that {key} has field {field}")]
fn given_soft_assertion(step_runner_state: &StepRunnerState, key: String, field: String) {
    push_plan(
        step_runner_state,
        PlannedStep::AssertKeys {
            key,
            field,
            soft: true,
        },
    );
}

fn build_step(planned: PlannedStep) -> Step<FakeCloud> {
    match planned {
        PlannedStep::Call { key } => {
            let lookup = key.clone();
            Step::api_call(key, move |client: &FakeCloud| client.fetch(&lookup))
        }
        PlannedStep::AssertKeys { key, field, soft } => {
            let step = Step::assert_keys(key, [field]);
            if soft { step.soft() } else { step }
        }
    }
}

#[when("the steps are run")]
fn when_steps_run(step_runner_state: &StepRunnerState) -> StepResult<()> {
    let plan = step_runner_state
        .plan
        .get()
        .ok_or_else(|| String::from("plan should be initialised"))?;
    let responses = step_runner_state.responses.get().unwrap_or_default();

    let client = FakeCloud {
        responses: responses.into_iter().collect(),
    };
    let bag = StateBag::new(client);
    let mut runner = Runner::new(plan.into_iter().map(build_step).collect());

    let outcome = runner
        .run(&bag)
        .map(|summary| summary.executed)
        .map_err(|e| e.to_string());
    let accumulated = bag
        .errors_or_nil()
        .map(|errors| errors.messages())
        .unwrap_or_default();

    step_runner_state.observation.set(RunObservation {
        outcome,
        state: runner.state(),
        keys: bag.keys(),
        accumulated,
    });
    Ok(())
}
