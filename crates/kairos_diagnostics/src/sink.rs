//! Thread-safe diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Collects diagnostics from the parsers and the analyzer.
///
/// Passed by shared reference into every stage. Counts are tracked
/// atomically so `has_errors` and `warning_count` never lock.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
    warning_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
            warning_count: AtomicUsize::new(0),
        }
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        match diag.severity {
            Severity::Error => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
            }
            Severity::Warning => {
                self.warning_count.fetch_add(1, Ordering::Relaxed);
            }
            Severity::Note | Severity::Help => {}
        }
        self.lock().push(diag);
    }

    /// Returns `true` if any error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Returns the number of errors emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Returns the number of warnings emitted so far.
    pub fn warning_count(&self) -> usize {
        self.warning_count.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Returns `true` if any held diagnostic satisfies `pred`.
    pub fn any(&self, pred: impl Fn(&Diagnostic) -> bool) -> bool {
        self.lock().iter().any(pred)
    }

    // A panicking emitter cannot leave the Vec half-written, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use kairos_source::Span;

    fn make_warning(n: u16) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::new(Category::Netlist, n),
            "flying wire",
            Span::DUMMY,
        )
    }

    fn make_error() -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::new(Category::Timing, 4),
            "setup violated",
            Span::DUMMY,
        )
    }

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.warning_count(), 0);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn counts_by_severity() {
        let sink = DiagnosticSink::new();
        sink.emit(make_warning(3));
        sink.emit(make_warning(1));
        sink.emit(make_error());
        assert_eq!(sink.warning_count(), 2);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.has_errors());
    }

    #[test]
    fn any_matches_code() {
        let sink = DiagnosticSink::new();
        sink.emit(make_warning(3));
        assert!(sink.any(|d| d.code.number == 3));
        assert!(!sink.any(|d| d.code.category == Category::Library));
    }

    #[test]
    fn thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let sink = Arc::new(DiagnosticSink::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..50 {
                        sink.emit(make_warning(3));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.warning_count(), 400);
        assert_eq!(sink.diagnostics().len(), 400);
    }
}
