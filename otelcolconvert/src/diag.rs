use std::fmt::{Display, Formatter};

use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// A single message produced while converting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {}", self.severity, self.summary)
    }
}

/// An ordered list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a list holding one critical diagnostic.
    pub fn critical(summary: impl Into<String>) -> Self {
        let mut diags = Self::new();
        diags.add(Severity::Critical, summary);
        diags
    }

    pub fn add(&mut self, severity: Severity, summary: impl Into<String>) {
        self.0.push(Diagnostic {
            severity,
            summary: summary.into(),
        });
    }

    pub fn add_all(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_critical(&self) -> bool {
        self.has_severity_at_least(Severity::Critical)
    }

    pub fn has_severity_at_least(&self, severity: Severity) -> bool {
        self.0.iter().any(|d| d.severity >= severity)
    }

    /// Drops every diagnostic with exactly the given severity.
    pub fn remove_by_severity(&mut self, severity: Severity) {
        self.0.retain(|d| d.severity != severity);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

impl std::error::Error for Diagnostics {}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
