//! Acceptance-test entry point.
//!
//! [`acc_test`] ties the pieces together for one [`TestCase`]: it checks the
//! environment gate, asks the caller to construct the client handle, runs the
//! steps against a fresh [`StateBag`], and folds the bag's accumulated
//! failures into the result. Nothing here holds global state; the client is
//! built by the caller-supplied factory on every call.
//!
//! # Example
//!
//! ```ignore
//! use acctest::harness::{TestCase, acc_test};
//! use acctest::step::Step;
//!
//! let case = TestCase::new(vec![
//!     Step::api_call("config", |client: &Client| client.get_config()),
//!     Step::assert_keys("config", ["DefaultNetwork"]),
//! ]);
//! let outcome = acc_test(case, &config, &mockable::DefaultEnv::new(), Client::from_config)?;
//! ```

use std::fmt;

use camino::Utf8Path;
use tracing::{debug, info, info_span};

use crate::config::{AccTestConfig, load_config};
use crate::error::{AccTestError, Result};
use crate::logging;
use crate::runner::Runner;
use crate::state::{MultiError, StateBag};
use crate::step::Step;

/// An ordered list of steps plus the conditions under which it runs.
pub struct TestCase<C> {
    name: String,
    steps: Vec<Step<C>>,
    required_env: Vec<String>,
    skip: bool,
}

impl<C> TestCase<C> {
    /// Creates a case that runs `steps` in order.
    #[must_use]
    pub fn new(steps: Vec<Step<C>>) -> Self {
        Self {
            name: String::from("acceptance test"),
            steps,
            required_env: Vec::new(),
            skip: false,
        }
    }

    /// Sets the name used in log events.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Requires `var` to be set and non-empty, in addition to the configured
    /// gate variable.
    #[must_use]
    pub fn require_env(mut self, var: impl Into<String>) -> Self {
        self.required_env.push(var.into());
        self
    }

    /// Marks the case to be skipped unconditionally.
    #[must_use]
    pub const fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Returns the case name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step<C>] {
        &self.steps
    }

    /// Returns the first reason this case must not run, if any.
    fn skip_reason<E: mockable::Env>(&self, config: &AccTestConfig, env: &E) -> Option<String> {
        if self.skip {
            return Some(String::from("test case is marked skip"));
        }

        let gate = config.gate_env.as_str();
        std::iter::once(gate)
            .filter(|var| !var.is_empty())
            .chain(self.required_env.iter().map(String::as_str))
            .find(|var| env.string(var).is_none_or(|value| value.is_empty()))
            .map(|var| format!("acceptance tests require {var} to be set"))
    }
}

impl<C> fmt::Debug for TestCase<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("required_env", &self.required_env)
            .field("skip", &self.skip)
            .finish()
    }
}

/// Result of a test case that did not fail.
#[derive(Debug, Clone)]
pub enum TestOutcome {
    /// The case did not run.
    Skipped {
        /// Why the case was skipped.
        reason: String,
    },
    /// Every step ran without a step-fatal failure.
    Passed {
        /// Number of steps executed.
        steps: usize,
        /// Failures recorded in the bag, when the configuration tolerates them.
        accumulated: Option<MultiError>,
    },
}

impl TestOutcome {
    /// Returns whether the case was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Runs one acceptance-test case.
///
/// # Errors
///
/// Returns `AccTestError::ClientSetup` when `make_client` fails,
/// `AccTestError::Step` when a step aborts the run, and
/// `AccTestError::Accumulated` when steps recorded failures and
/// `config.fail_on_accumulated` is set.
pub fn acc_test<C, E, F>(
    case: TestCase<C>,
    config: &AccTestConfig,
    env: &E,
    make_client: F,
) -> Result<TestOutcome>
where
    E: mockable::Env,
    F: FnOnce(&AccTestConfig) -> eyre::Result<C>,
{
    let span = info_span!("acc_test", case = %case.name);
    let _entered = span.enter();

    if let Some(reason) = case.skip_reason(config, env) {
        info!(%reason, "skipping test case");
        return Ok(TestOutcome::Skipped { reason });
    }

    let client = make_client(config).map_err(|report| AccTestError::ClientSetup {
        message: format!("{report:#}"),
    })?;
    let bag = StateBag::new(client);
    let mut runner = Runner::new(case.steps);
    let summary = runner.run(&bag)?;

    match bag.errors_or_nil() {
        Some(errors) if config.fail_on_accumulated => Err(errors.into()),
        accumulated => Ok(TestOutcome::Passed {
            steps: summary.executed,
            accumulated,
        }),
    }
}

/// Runs one case with configuration loaded from the process environment.
///
/// Loads [`AccTestConfig`] (honouring `config_path` when given), installs
/// the test log subscriber, and delegates to [`acc_test`].
///
/// # Errors
///
/// Returns configuration errors, plus everything [`acc_test`] returns.
pub fn run_acceptance<C, F>(
    case: TestCase<C>,
    config_path: Option<&Utf8Path>,
    make_client: F,
) -> Result<TestOutcome>
where
    F: FnOnce(&AccTestConfig) -> eyre::Result<C>,
{
    let env = mockable::DefaultEnv::new();
    let config = load_config(&env, config_path)?;
    if !logging::try_init(&config.logging) {
        debug!("log subscriber already installed");
    }
    acc_test(case, &config, &env, make_client)
}
