//! # Error Sinks
//!
//! Pass-scoped accumulators for [`ValidationError`] records. A sink is
//! created by the owner of a validation pass, handed by `&mut` to every type
//! model constructed during the pass, and drained once the pass is over.
//!
//! - [`Diagnostics`]: plain single-threaded accumulator.
//! - [`SharedSink`]: clonable handle over a mutex-guarded buffer, for passes
//!   that validate independent types on several threads. Record order across
//!   threads is unspecified; no record is lost.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ErrorKind, ValidationError};

/// Receives validation records. Implementations must never fail.
pub trait ErrorSink {
    /// Append one record.
    fn record(&mut self, error: ValidationError);
}

impl ErrorSink for Vec<ValidationError> {
    fn record(&mut self, error: ValidationError) {
        self.push(error);
    }
}

/// Collection of validation records from one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    errors: Vec<ValidationError>,
}

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a slice of all records in arrival order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Number of records of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }

    /// Order records by (kind, context, subject) so reports do not depend
    /// on validation order.
    pub fn sort(&mut self) {
        self.errors
            .sort_by_cached_key(|e| (e.kind(), e.context().to_string(), e.subject(), e.to_string()));
    }
}

impl ErrorSink for Diagnostics {
    fn record(&mut self, error: ValidationError) {
        self.errors.push(error);
    }
}

impl From<Vec<ValidationError>> for Diagnostics {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}: {e}", e.kind())?;
        }
        Ok(())
    }
}

/// Thread-safe sink. Clone it once per worker; all clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    inner: Arc<Mutex<Vec<ValidationError>>>,
}

impl SharedSink {
    /// An empty shared buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently buffered.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Take every buffered record, leaving the buffer empty.
    pub fn drain(&self) -> Diagnostics {
        Diagnostics::from(std::mem::take(&mut *self.inner.lock()))
    }
}

impl ErrorSink for SharedSink {
    fn record(&mut self, error: ValidationError) {
        self.inner.lock().push(error);
    }
}
