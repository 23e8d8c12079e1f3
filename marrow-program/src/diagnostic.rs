//! Diagnostics (spec §10 ambient stack: the core reports failures through a
//! sink rather than formatting user-facing text itself — rendering belongs
//! to the driver, an external collaborator per spec §1).

use std::fmt;

use crate::decl::Site;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub site: Site,
    pub message: String,
}

impl Diagnostic {
    pub fn error(site: Site, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            site,
            message: message.into(),
        }
    }

    pub fn note(site: Site, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Note,
            site,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {:?}: {}", self.severity, self.site, self.message)
    }
}

/// An accumulating sink, shared by value across the constraint system's
/// solver forks and the IR's mandatory passes so every diagnostic produced
/// anywhere in the core ends up in one place for the driver to render.
#[derive(Default, Clone, Debug)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_ignores_notes() {
        let mut sink = DiagnosticSink::new();
        sink.report(Diagnostic::note(Site(0), "fyi"));
        assert!(!sink.has_errors());
        sink.report(Diagnostic::error(Site(0), "nope"));
        assert!(sink.has_errors());
    }
}
