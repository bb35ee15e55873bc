//! The five log severity levels required by the driver surface (spec §6.3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a logged diagnostic, ordered from least to most severe.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Fine-grained internal tracing, not normally surfaced to the user.
    Debug,
    /// Progress detail a user running with `-v` would want to see.
    Verbose,
    /// Notable but expected events, e.g. a DRC fixup mutating configuration.
    Notice,
    /// A condition the device tolerates but that likely indicates a mistake.
    Warning,
    /// A condition that will cause `do_par` to return `false`.
    Error,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Verbose => write!(f, "verbose"),
            Severity::Notice => write!(f, "notice"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Severity::Debug < Severity::Verbose);
        assert!(Severity::Verbose < Severity::Notice);
        assert!(Severity::Notice < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn is_error() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Severity::Notice), "notice");
        assert_eq!(format!("{}", Severity::Error), "error");
    }
}
