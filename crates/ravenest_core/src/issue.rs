//! Lint findings.
//!
//! An [`Issue`] is one finding about the content: where it is, what is wrong
//! and how bad it is. Issues are immutable once created and are kept in the
//! order they were produced.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::loader::LineIndex;

/// Severity of a lint issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Content is unusable or ambiguous. Fails the run.
    Error,
    /// Stylistic or soft-constraint violation. Informational only.
    Warn,
}

impl Severity {
    /// Label used in formatted output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an issue was found: file, 1-based line, optional column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// File or directory the issue refers to.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, when the source knows it.
    pub column: Option<usize>,
}

impl Location {
    /// Location at a line with no column.
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: line.max(1),
            column: None,
        }
    }

    /// Location with an explicit column. Non-positive columns are dropped.
    pub fn with_column(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line: line.max(1),
            column: (column > 0).then_some(column),
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Issue {
    location: Location,
    message: String,
    severity: Severity,
}

impl Issue {
    /// Create an issue.
    pub fn new(location: Location, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            location,
            message: message.into(),
            severity,
        }
    }

    /// Create an ERROR issue.
    pub fn error(location: Location, message: impl Into<String>) -> Self {
        Self::new(location, message, Severity::Error)
    }

    /// Create a WARN issue.
    pub fn warn(location: Location, message: impl Into<String>) -> Self {
        Self::new(location, message, Severity::Warn)
    }

    /// Where the issue was found.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Issue severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether this is an ERROR.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format as `SEVERITY: <file>:<line>[:<column>]: <message>`.
    #[must_use]
    pub fn format(&self, show_column: bool) -> String {
        let mut location = format!(
            "{}:{}",
            self.location.file.display(),
            self.location.line
        );
        if show_column {
            if let Some(column) = self.location.column {
                location.push_str(&format!(":{column}"));
            }
        }
        format!("{}: {}: {}", self.severity, location, self.message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(true))
    }
}

/// Collects the issues for one config file.
///
/// Owns the file's path and a [`LineIndex`] over its text so validators can
/// attach a best-effort line to each finding.
#[derive(Debug)]
pub struct IssueSink<'a> {
    file: PathBuf,
    lines: LineIndex<'a>,
    issues: Vec<Issue>,
}

impl<'a> IssueSink<'a> {
    /// Create a sink for `file` whose text is `content`.
    pub fn new(file: impl Into<PathBuf>, content: &'a str) -> Self {
        Self {
            file: file.into(),
            lines: LineIndex::new(content),
            issues: Vec::new(),
        }
    }

    /// File the sink reports against.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Line index over the file text.
    #[must_use]
    pub fn lines(&self) -> &LineIndex<'a> {
        &self.lines
    }

    /// Record an ERROR at `line`.
    pub fn error_at(&mut self, line: usize, message: impl Into<String>) {
        let location = Location::new(self.file.clone(), line);
        self.issues.push(Issue::error(location, message));
    }

    /// Record a WARN at `line`.
    pub fn warn_at(&mut self, line: usize, message: impl Into<String>) {
        let location = Location::new(self.file.clone(), line);
        self.issues.push(Issue::warn(location, message));
    }

    /// Record an issue of the given severity at `line`.
    pub fn report(&mut self, severity: Severity, line: usize, message: impl Into<String>) {
        let location = Location::new(self.file.clone(), line);
        self.issues.push(Issue::new(location, message, severity));
    }

    /// Record a file-level ERROR (line 1).
    pub fn error(&mut self, message: impl Into<String>) {
        self.error_at(1, message);
    }

    /// Record a file-level WARN (line 1).
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warn_at(1, message);
    }

    /// Record a fully-formed issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Number of ERRORs recorded so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    /// Issues recorded so far.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consume the sink, returning its issues in insertion order.
    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
