//! Non-fatal conditions recorded during resolution.

use serde::Serialize;
use std::fmt;

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An element name occurred twice in one content model; the first wins.
    DuplicateElement,
    /// A header-only element without a resolvable type was skipped.
    SkippedHeaderElement,
    /// An element wildcard was skipped.
    SkippedWildcard,
    /// An abstract type has no concrete subtype to expand to.
    NoConcreteSubtypes,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DuplicateElement => "duplicate element",
            Self::SkippedHeaderElement => "skipped header element",
            Self::SkippedWildcard => "skipped wildcard",
            Self::NoConcreteSubtypes => "no concrete subtypes",
        };
        f.write_str(name)
    }
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Category.
    pub kind: DiagnosticKind,
    /// Qualified name of the offending construct.
    pub subject: String,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': {}", self.kind, self.subject, self.message)
    }
}
