//! Diagnostics reported while analyzing and emitting declarations.
//!
//! Generation never aborts on a single bad declaration. Problems are reported
//! as [`Diagnostic`]s to a [`DiagnosticSink`] and the batch moves on.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

/// Interface has no method with a recognized HTTP verb.
pub const NO_HTTP_METHODS: &str = "WAG001";
/// Method has no HTTP verb annotation and is dropped.
pub const MISSING_VERB: &str = "WAG002";
/// Annotation argument or member could not be resolved.
pub const UNRESOLVED_MEMBER: &str = "WAG003";
/// Ancestor named in `extends` is not declared.
pub const UNKNOWN_ANCESTOR: &str = "WAG004";
/// Same-name method with a different signature.
pub const DUPLICATE_METHOD: &str = "WAG005";
/// URL placeholder without a matching path parameter.
pub const UNMATCHED_PLACEHOLDER: &str = "WAG006";
/// Token expansion produced a name that already exists.
pub const EXPANSION_COLLISION: &str = "WAG007";
/// More than one body parameter.
pub const MULTIPLE_BODIES: &str = "WAG008";
/// Wrap descriptor is missing required metadata.
pub const WRAP_METADATA: &str = "WAG009";
/// Emission of a declaration failed.
pub const GENERATION_FAILED: &str = "WAG010";
/// Duplicate declaration across contract documents.
pub const DUPLICATE_DECLARATION: &str = "WAG011";

/// How bad a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Where a diagnostic points: the contract document and the declared symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Contract document the declaration came from
    pub source: String,
    /// Dotted symbol path, e.g. `IUserApi.GetUserAsync`
    pub symbol: String,
}

impl Location {
    pub fn new(source: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_empty() {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{}: {}", self.source, self.symbol)
        }
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn warning(code: &'static str, message: impl Into<String>, location: Location) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>, location: Location) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}[{}]: {}",
            self.location, self.severity, self.code, self.message
        )
    }
}

/// Receiver of diagnostics. Implementations must tolerate concurrent reports.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Thread-safe collecting sink that mirrors every report to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far, in report order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => log::info!("{}", diagnostic),
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Error => log::error!("{}", diagnostic),
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }
}
