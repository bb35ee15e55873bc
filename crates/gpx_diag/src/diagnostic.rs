//! Structured diagnostic messages.
//!
//! Unlike a compiler frontend, the PAR core has no source spans to anchor
//! diagnostics to — by the time a design reaches this core it is already a
//! flat, technology-mapped netlist. A diagnostic instead optionally names
//! the netlist cell(s) or device site(s) it concerns, mirroring the plain
//! `printf`-style messages ("Cell %s has invalid LOC constraint %s...") the
//! original tool produces.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A single structured log/diagnostic message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The human-readable message, already formatted with any cell/site names.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic at the given severity.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Creates an error-severity diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates a warning-severity diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Creates a notice-severity diagnostic.
    pub fn notice(message: impl Into<String>) -> Self {
        Self::new(Severity::Notice, message)
    }

    /// Creates a verbose-severity diagnostic.
    pub fn verbose(message: impl Into<String>) -> Self {
        Self::new(Severity::Verbose, message)
    }

    /// Creates a debug-severity diagnostic.
    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }
}
