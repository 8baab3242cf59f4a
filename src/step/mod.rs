//! Step variants executed against a state bag.
//!
//! A [`Step`] is one unit of work in a test case. The set of variants is
//! closed:
//!
//! - [`ApiCall`]: calls the system under test through the client handle and
//!   stores the result under a key.
//! - [`AssertKeys`]: checks that a stored value exposes non-empty fields.
//! - [`AssertFunc`]: runs an arbitrary predicate against the whole bag.
//! - [`Step::soft`]: wraps any step so its failure is recorded in the bag's
//!   error sink instead of aborting the run.
//!
//! Step closures report failures as `eyre::Report`; the step wraps them into
//! a [`StepError`] that names the state key involved.

mod inspect;

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StepError;
use crate::state::StateBag;

pub use inspect::{FieldPresence, inspect_field, is_empty_value};

type CallFn<C> = Box<dyn Fn(&C) -> Result<Value, StepError> + Send + Sync>;
type CleanupFn<C> = Box<dyn Fn(&C, &Value) -> eyre::Result<()> + Send + Sync>;
type AssertFn<C> = Box<dyn Fn(&StateBag<C>) -> eyre::Result<()> + Send + Sync>;

/// Name given to assertion functions constructed without one.
pub const DEFAULT_ASSERT_FUNC_NAME: &str = "assert-func";

/// How a step finished when it did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The step did its work without writing to the bag.
    Passed,
    /// An API-call step stored this value under its key.
    Stored(Value),
    /// A soft step failed and recorded the failure in the bag.
    SoftFailed,
}

/// Calls the system under test and stores the result.
///
/// The call runs once per run. Its result is serialised into a document and
/// stored under [`key`](Self::key); a failed call aborts the run.
pub struct ApiCall<C> {
    key: String,
    call: CallFn<C>,
    cleanup: Option<CleanupFn<C>>,
}

impl<C> ApiCall<C> {
    /// Creates a step that stores the result of `call` under `key`.
    pub fn new<T, F>(key: impl Into<String>, call: F) -> Self
    where
        T: Serialize,
        F: Fn(&C) -> eyre::Result<T> + Send + Sync + 'static,
    {
        let key_value = key.into();
        let call_key = key_value.clone();
        let wrapped: CallFn<C> = Box::new(move |client: &C| {
            let result = call(client).map_err(|report| StepError::CallFailed {
                key: call_key.clone(),
                report,
            })?;
            serde_json::to_value(result).map_err(|e| StepError::Encode {
                key: call_key.clone(),
                message: e.to_string(),
            })
        });

        Self {
            key: key_value,
            call: wrapped,
            cleanup: None,
        }
    }

    /// Attaches a cleanup operation that receives the stored value.
    ///
    /// Cleanup runs after the whole run finishes, in reverse step order, and
    /// only if this step succeeded.
    #[must_use]
    pub fn with_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: Fn(&C, &Value) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// Returns the state key this step writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns whether a cleanup operation is attached.
    #[must_use]
    pub const fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }

    fn execute(&self, bag: &StateBag<C>) -> Result<Value, StepError> {
        let value = (self.call)(bag.client())?;
        bag.put(self.key.clone(), value.clone());
        Ok(value)
    }

    /// Runs the attached cleanup against the value this step stored.
    ///
    /// A later step overwriting the key does not change what cleanup sees.
    fn cleanup(&self, bag: &StateBag<C>, stored: &Value) {
        let Some(cleanup) = self.cleanup.as_ref() else {
            return;
        };
        if !bag.contains_key(&self.key) {
            debug!(key = %self.key, "state key no longer present; skipping cleanup");
            return;
        }
        if let Err(report) = cleanup(bag.client(), stored) {
            warn!(key = %self.key, error = %report, "cleanup failed");
            bag.append_error(report.wrap_err(format!(
                "cleanup for state key '{}' failed",
                self.key
            )));
        }
    }
}

/// Checks that a stored value exposes every named field with content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertKeys {
    key: String,
    fields: Vec<String>,
}

impl AssertKeys {
    /// Creates an assertion over the value stored under `key`.
    pub fn new<I, S>(key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the state key this assertion reads.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the field names this assertion requires.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn execute<C>(&self, bag: &StateBag<C>) -> Result<(), StepError> {
        let value = bag
            .get_ok(&self.key)
            .ok_or_else(|| StepError::StateKeyNotFound {
                key: self.key.clone(),
            })?;

        // The first failing field is reported.
        for field in &self.fields {
            match inspect_field(&value, field) {
                FieldPresence::Present => {}
                FieldPresence::Missing => {
                    return Err(StepError::MissingField {
                        key: self.key.clone(),
                        field: field.clone(),
                    });
                }
                FieldPresence::Empty => {
                    return Err(StepError::EmptyField {
                        key: self.key.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Runs a caller-supplied predicate against the whole bag.
pub struct AssertFunc<C> {
    name: String,
    assert: AssertFn<C>,
}

impl<C> AssertFunc<C> {
    /// Creates an unnamed assertion.
    pub fn new<F>(assert: F) -> Self
    where
        F: Fn(&StateBag<C>) -> eyre::Result<()> + Send + Sync + 'static,
    {
        Self::named(DEFAULT_ASSERT_FUNC_NAME, assert)
    }

    /// Creates an assertion with a descriptive name used in logs.
    pub fn named<F>(name: impl Into<String>, assert: F) -> Self
    where
        F: Fn(&StateBag<C>) -> eyre::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            assert: Box::new(assert),
        }
    }

    fn execute(&self, bag: &StateBag<C>) -> Result<(), StepError> {
        (self.assert)(bag).map_err(StepError::Assertion)
    }
}

/// One unit of work in a test case.
pub enum Step<C> {
    /// Call the system under test and store the result.
    ApiCall(ApiCall<C>),
    /// Assert that a stored value exposes non-empty fields.
    AssertKeys(AssertKeys),
    /// Run a predicate against the bag.
    AssertFunc(AssertFunc<C>),
    /// Record the wrapped step's failure instead of aborting.
    Soft(Box<Step<C>>),
}

impl<C> Step<C> {
    /// Shorthand for [`ApiCall::new`].
    pub fn api_call<T, F>(key: impl Into<String>, call: F) -> Self
    where
        T: Serialize,
        F: Fn(&C) -> eyre::Result<T> + Send + Sync + 'static,
    {
        Self::ApiCall(ApiCall::new(key, call))
    }

    /// Shorthand for [`AssertKeys::new`].
    pub fn assert_keys<I, S>(key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AssertKeys(AssertKeys::new(key, fields))
    }

    /// Shorthand for [`AssertFunc::new`].
    pub fn assert_func<F>(assert: F) -> Self
    where
        F: Fn(&StateBag<C>) -> eyre::Result<()> + Send + Sync + 'static,
    {
        Self::AssertFunc(AssertFunc::new(assert))
    }

    /// Wraps this step so a failure is appended to the bag's error sink and
    /// the run continues.
    #[must_use]
    pub fn soft(self) -> Self {
        Self::Soft(Box::new(self))
    }

    /// Returns a descriptive name for logs and diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::ApiCall(call) => format!("call:{}", call.key),
            Self::AssertKeys(assert) => format!("assert-keys:{}", assert.key),
            Self::AssertFunc(assert) => assert.name.clone(),
            Self::Soft(inner) => format!("soft:{}", inner.name()),
        }
    }

    /// Executes the step against `bag`.
    ///
    /// # Errors
    ///
    /// Returns the step-fatal failure that must abort the run. Soft steps
    /// never return an error.
    pub fn execute(&self, bag: &StateBag<C>) -> Result<StepStatus, StepError> {
        match self {
            Self::ApiCall(call) => call.execute(bag).map(StepStatus::Stored),
            Self::AssertKeys(assert) => assert.execute(bag).map(|()| StepStatus::Passed),
            Self::AssertFunc(assert) => assert.execute(bag).map(|()| StepStatus::Passed),
            Self::Soft(inner) => inner.execute(bag).or_else(|error| {
                warn!(step = %inner.name(), %error, "soft step failed; continuing");
                bag.append_error(error);
                Ok(StepStatus::SoftFailed)
            }),
        }
    }

    /// Runs any cleanup attached to this step, handing it `stored`, the
    /// value this step's execution returned in [`StepStatus::Stored`].
    ///
    /// Cleanup failures are appended to the bag's error sink.
    pub(crate) fn cleanup(&self, bag: &StateBag<C>, stored: &Value) {
        match self {
            Self::ApiCall(call) => call.cleanup(bag, stored),
            Self::Soft(inner) => inner.cleanup(bag, stored),
            Self::AssertKeys(_) | Self::AssertFunc(_) => {}
        }
    }
}

impl<C> From<ApiCall<C>> for Step<C> {
    fn from(call: ApiCall<C>) -> Self {
        Self::ApiCall(call)
    }
}

impl<C> From<AssertKeys> for Step<C> {
    fn from(assert: AssertKeys) -> Self {
        Self::AssertKeys(assert)
    }
}

impl<C> From<AssertFunc<C>> for Step<C> {
    fn from(assert: AssertFunc<C>) -> Self {
        Self::AssertFunc(assert)
    }
}

impl<C> fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Step").field(&self.name()).finish()
    }
}
