//! Accumulates [`Diagnostic`] records as a document is parsed and
//! validated, and produces a stable, sorted snapshot on demand.

use crate::diagnostic::{Category, Diagnostic, Location, Severity};

/// Collects diagnostics emitted across delimiter detection, lexing, tree
/// assembly, and field validation into one ordered list.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic, filling in `location` if the diagnostic
    /// doesn't already carry one more specific.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(code = %diagnostic.code, severity = %diagnostic.severity, "diagnostic emitted");
        self.diagnostics.push(diagnostic);
    }

    pub fn emit_with_context(&mut self, mut diagnostic: Diagnostic, fallback: Location) {
        if diagnostic.location == Location::default() {
            diagnostic.location = fallback;
        }
        self.emit(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error_or_worse)
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.category == category)
    }

    /// A stable snapshot ordered by ascending byte offset, ties broken by
    /// shallowest structural path first.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        let mut sorted = self.diagnostics.clone();
        sorted.sort_by(|a, b| {
            a.location
                .byte_offset
                .cmp(&b.location.byte_offset)
                .then_with(|| a.location.depth().cmp(&b.location.depth()))
        });
        sorted
    }

    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut sorted = self.diagnostics;
        sorted.sort_by(|a, b| {
            a.location
                .byte_offset
                .cmp(&b.location.byte_offset)
                .then_with(|| a.location.depth().cmp(&b.location.depth()))
        });
        sorted
    }
}
