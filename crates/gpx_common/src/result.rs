//! The internal (programmer-error) result type used throughout the core.
//!
//! Netlist errors, resource exhaustion and DRC failures are *not* represented
//! here — those are ordinary outcomes of `do_par` and are reported through
//! the diagnostic sink (see `gpx_diag`) while `do_par` returns `false`.
//! [`ParError`] is reserved for states that should be unreachable: a
//! malformed graph operation, an unknown primitive surviving into commit,
//! and the like.

use thiserror::Error;

/// The result type for internal (programmer-error) failures.
pub type ParResult<T> = Result<T, ParError>;

/// An internal compiler error: a broken invariant that indicates a bug in
/// the core rather than a problem with the user's netlist.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("internal PAR error: {message}")]
pub struct ParError {
    /// Human-readable description of the broken invariant.
    pub message: String,
}

impl ParError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ParError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
