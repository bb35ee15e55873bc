//! Thread-safe diagnostic accumulator.
//!
//! The core is single-threaded (spec §5) but the sink stays internally
//! synchronized anyway: it is the injection point a caller uses to route
//! log lines to its own destination (terminal, file, TUI), and callers are
//! free to inspect it from outside the PAR call.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Accumulates diagnostics emitted during a `do_par` run.
///
/// Log destination is injected, not owned by the core (spec §6.3): the
/// driver creates a `DiagnosticSink`, passes it down by reference through
/// every stage, and the caller decides afterward how to render `take_all()`.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Records a diagnostic, bumping the error counter if it is error-severity.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.diagnostics
            .lock()
            .expect("diagnostic sink mutex poisoned")
            .push(diagnostic);
    }

    /// Shorthand for `emit(Diagnostic::error(message))`.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Diagnostic::error(message));
    }

    /// Shorthand for `emit(Diagnostic::warning(message))`.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Diagnostic::warning(message));
    }

    /// Shorthand for `emit(Diagnostic::notice(message))`.
    pub fn notice(&self, message: impl Into<String>) {
        self.emit(Diagnostic::notice(message));
    }

    /// Shorthand for `emit(Diagnostic::verbose(message))`.
    pub fn verbose(&self, message: impl Into<String>) {
        self.emit(Diagnostic::verbose(message));
    }

    /// Shorthand for `emit(Diagnostic::debug(message))`.
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(Diagnostic::debug(message));
    }

    /// Returns `true` if any error-severity diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Drains and returns all diagnostics emitted so far. Does not reset the
    /// error counter.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics.lock().expect("diagnostic sink mutex poisoned"))
    }

    /// Returns a clone of all diagnostics emitted so far, without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .expect("diagnostic sink mutex poisoned")
            .clone()
    }
}
