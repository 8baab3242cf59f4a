//! Acceptance-test step runner with a shared, concurrency-safe state bag.
//!
//! `acctest` runs ordered sequences of steps against a live external system.
//! Steps pass intermediate results to each other through a [`StateBag`], and
//! may record non-fatal failures into the same bag instead of aborting the
//! run. The system under test is reached through an opaque client handle the
//! caller constructs; this crate never looks inside it.
//!
//! # Modules
//!
//! - [`state`]: The state bag and its combined error type
//! - [`step`]: API-call, assert-keys, and assert-function steps
//! - [`runner`]: Fail-fast sequential execution with reverse-order cleanup
//! - [`harness`]: Environment-gated entry point for one test case
//! - [`config`]: Layered configuration (env > file > defaults)
//! - [`logging`]: Test log subscriber installation
//! - [`error`]: Semantic error types
//!
//! [`StateBag`]: state::StateBag

pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod runner;
pub mod state;
pub mod step;
