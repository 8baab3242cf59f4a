//! The state bag shared by every step of one acceptance-test run.
//!
//! A [`StateBag`] carries three things: the named results that steps write
//! for later steps to read, an append-only sink of non-fatal failures, and the
//! client handle steps use to reach the system under test.
//!
//! Values are stored as `serde_json::Value` documents. API-call steps
//! normalise their typed results into this form on write, which gives
//! assertion steps a uniform shape to inspect by field name. Typed reads go
//! back through [`StateBag::get_as`].
//!
//! Every operation is internally synchronised, so a bag may be shared across
//! threads whenever its client handle can be. The value map is allocated on
//! the first write only; bags created for skipped runs never allocate it.

mod multi_error;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::StateError;

pub use multi_error::MultiError;

/// Shared key/value context and error sink for a single run.
///
/// # Type Parameters
///
/// * `C` - The client handle steps call into. The bag never inspects it.
pub struct StateBag<C> {
    client: C,
    data: OnceLock<RwLock<HashMap<String, Value>>>,
    errors: RwLock<Vec<Arc<eyre::Report>>>,
}

impl<C> StateBag<C> {
    /// Creates an empty bag holding the given client handle.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self {
            client,
            data: OnceLock::new(),
            errors: RwLock::new(Vec::new()),
        }
    }

    /// Returns the client handle supplied at construction.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Looks up `key`, returning `Value::Null` when it is absent.
    ///
    /// Use [`get_ok`](Self::get_ok) when a stored `null` must be told apart
    /// from a missing key.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        self.get_ok(key).unwrap_or(Value::Null)
    }

    /// Looks up `key`, returning `None` when it was never stored or has been
    /// removed.
    #[must_use]
    pub fn get_ok(&self, key: &str) -> Option<Value> {
        let map = self.data.get()?;
        read(map).get(key).cloned()
    }

    /// Decodes the value stored under `key` into `T`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Decode` when the stored document does not match
    /// the shape of `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StateError> {
        self.get_ok(key)
            .map(|value| {
                serde_json::from_value(value).map_err(|e| StateError::Decode {
                    key: key.to_owned(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Returns whether a value is currently stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data
            .get()
            .is_some_and(|map| read(map).contains_key(key))
    }

    /// Returns the stored keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .data
            .get()
            .map(|map| read(map).keys().cloned().collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        let map = self.data.get_or_init(|| {
            trace!("initialising state bag storage");
            RwLock::new(HashMap::new())
        });
        write(map).insert(key.into(), value.into());
    }

    /// Removes `key` if present.
    pub fn remove(&self, key: &str) {
        if let Some(map) = self.data.get() {
            write(map).remove(key);
        }
    }

    /// Records a non-fatal failure.
    ///
    /// Recorded failures never abort the run; they surface only through
    /// [`errors_or_nil`](Self::errors_or_nil).
    pub fn append_error(&self, error: impl Into<eyre::Report>) {
        write(&self.errors).push(Arc::new(error.into()));
    }

    /// Returns every recorded failure combined, or `None` if there were none.
    #[must_use]
    pub fn errors_or_nil(&self) -> Option<MultiError> {
        let errors = read(&self.errors);
        if errors.is_empty() {
            return None;
        }
        Some(MultiError::new(errors.clone()))
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn error_count(&self) -> usize {
        read(&self.errors).len()
    }
}

impl<C> std::fmt::Debug for StateBag<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateBag")
            .field("keys", &self.keys())
            .field("errors", &self.error_count())
            .finish_non_exhaustive()
    }
}

// A panicking step must not leave the bag unusable for cleanup and reporting,
// so poisoned locks are recovered.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
