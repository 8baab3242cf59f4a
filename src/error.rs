//! Semantic error types for acctest.
//!
//! This module defines the error hierarchy for acctest, following the principle
//! of using semantic error enums (via `thiserror`) for conditions the caller
//! might inspect, while collaborator failures stay opaque (`eyre::Report`).
//! Step closures hand back `eyre::Report`s; the runner wraps them in
//! [`StepError`] so tests can tell a failed remote call apart from a failed
//! assertion.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::runner::RunState;
use crate::state::MultiError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: Utf8PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised when reading typed values back out of a state bag.
#[derive(Debug, Error)]
pub enum StateError {
    /// The stored document does not decode into the requested type.
    #[error("state key '{key}' does not hold the requested type: {message}")]
    Decode {
        /// The state key that was read.
        key: String,
        /// A description of the decoding failure.
        message: String,
    },
}

/// Step-fatal failures returned from [`crate::step::Step::execute`].
#[derive(Debug, Error)]
pub enum StepError {
    /// An assertion targeted a key no earlier step stored.
    #[error("state key not found: {key}")]
    StateKeyNotFound {
        /// The key that was looked up.
        key: String,
    },

    /// The stored value does not expose the named field.
    #[error("field '{field}' not found in state key '{key}'")]
    MissingField {
        /// The state key holding the inspected value.
        key: String,
        /// The field that was not found.
        field: String,
    },

    /// The named field exists but holds an empty or zero value.
    #[error("field '{field}' in state key '{key}' is empty")]
    EmptyField {
        /// The state key holding the inspected value.
        key: String,
        /// The field whose content is empty.
        field: String,
    },

    /// The collaborator call behind an API-call step failed.
    #[error("API call for state key '{key}' failed: {report}")]
    CallFailed {
        /// The key the call would have written.
        key: String,
        /// The collaborator's failure.
        report: eyre::Report,
    },

    /// The API-call result could not be normalised for storage.
    #[error("failed to store result under state key '{key}': {message}")]
    Encode {
        /// The key the call would have written.
        key: String,
        /// A description of the serialisation failure.
        message: String,
    },

    /// A user-supplied assertion returned a failure.
    #[error("{0}")]
    Assertion(eyre::Report),
}

impl StepError {
    /// Returns whether this failure reports a missing or empty field.
    #[must_use]
    pub const fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::EmptyField { .. })
    }
}

/// Errors returned by [`crate::runner::Runner::run`].
#[derive(Debug, Error)]
pub enum RunError {
    /// A step failed and the run was aborted.
    #[error(transparent)]
    Step(#[from] StepError),

    /// The runner already reached a terminal state.
    #[error("run cannot be restarted from state {state}")]
    NotRestartable {
        /// The state the runner was in when execution was requested.
        state: RunState,
    },
}

/// Top-level error type for acctest.
///
/// This enum aggregates the domain-specific errors into a single type. Test
/// functions typically convert it into an `eyre::Report` at their boundary.
#[derive(Debug, Error)]
pub enum AccTestError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A typed state read failed.
    #[error(transparent)]
    State(#[from] StateError),

    /// A step aborted the run.
    #[error(transparent)]
    Step(#[from] StepError),

    /// The runner refused to execute.
    #[error(transparent)]
    Run(RunError),

    /// The client factory failed before any step ran.
    #[error("failed to set up client: {message}")]
    ClientSetup {
        /// A description of the setup failure.
        message: String,
    },

    /// Steps recorded non-fatal failures into the state bag.
    #[error(transparent)]
    Accumulated(#[from] MultiError),
}

impl From<RunError> for AccTestError {
    fn from(error: RunError) -> Self {
        match error {
            RunError::Step(step_error) => Self::Step(step_error),
            other @ RunError::NotRestartable { .. } => Self::Run(other),
        }
    }
}

/// A specialised `Result` type for acctest operations.
pub type Result<T> = std::result::Result<T, AccTestError>;
