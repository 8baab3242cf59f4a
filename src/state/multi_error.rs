//! Combined representation of accumulated failures.

use std::fmt;
use std::sync::Arc;

/// Every failure a run appended to its state bag, in append order.
///
/// The display form lists each failure on its own bullet, including the
/// failure's cause chain.
#[derive(Debug, Clone)]
pub struct MultiError {
    errors: Vec<Arc<eyre::Report>>,
}

impl MultiError {
    pub(crate) const fn new(errors: Vec<Arc<eyre::Report>>) -> Self {
        Self { errors }
    }

    /// Returns the number of combined failures.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns whether no failures are combined.
    ///
    /// A `MultiError` obtained from a state bag is never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the underlying failures in append order.
    pub fn iter(&self) -> impl Iterator<Item = &eyre::Report> {
        self.errors.iter().map(Arc::as_ref)
    }

    /// Returns the rendered message of each failure in append order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.iter().map(|report| format!("{report:#}")).collect()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 {
            "error"
        } else {
            "errors"
        };
        write!(f, "{} {noun} occurred:", self.errors.len())?;
        for report in &self.errors {
            write!(f, "\n\t* {report:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}
