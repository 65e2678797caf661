// SPDX-License-Identifier: Apache-2.0

use parking_lot::Mutex;

/// How serious a reported [`Diagnostic`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A message reported during generation that did not abort it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Caller-supplied accumulator for non-fatal findings.
///
/// The generator reports to the sink by shared reference, so the sink keeps
/// its list behind a lock. Every emitted diagnostic is also forwarded to the
/// `log` facade.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        match diag.severity {
            Severity::Warning => log::warn!("{}", diag.message),
            Severity::Error => log::error!("{}", diag.message),
        }
        self.diagnostics.lock().push(diag);
    }

    /// Shorthand for emitting a warning.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Diagnostic::warning(message));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .lock()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Returns a snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drains the sink.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.warning_count(), 0);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn warnings_are_not_errors() {
        let sink = DiagnosticSink::new();
        sink.warning("opcode of add does not follow alphabetical order");
        assert!(!sink.has_errors());
        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn take_all_drains() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error("broken"));
        sink.warning("odd");
        assert!(sink.has_errors());
        let all = sink.take_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].severity, Severity::Error);
        assert!(sink.diagnostics().is_empty());
        assert!(!sink.has_errors());
    }
}
