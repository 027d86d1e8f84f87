//! Diagnostics and error reporting for UFO scripts
//!
//! Nothing in the parser aborts on bad input. Every problem is recorded here
//! and parsing moves on to the next block.

use serde::Serialize;
use std::fmt;

/// Byte range into the script source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 1-based line and column of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Block keyword has no registered factory
    UnknownKeyword,
    /// Named block kind without a name token
    MissingName,
    /// Header not followed by `{`
    MissingBody,
    /// A body grammar rejected the block contents
    MalformedBody,
    /// A keyword was registered twice
    DuplicateRegistration,
    /// Token that cannot start a block
    UnexpectedToken,
    /// Input ended inside a block
    UnexpectedEof,
    UnterminatedString,
    UnterminatedComment,
}

impl DiagnosticKind {
    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            Self::UnknownKeyword | Self::DuplicateRegistration => DiagnosticSeverity::Warning,
            _ => DiagnosticSeverity::Error,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::UnknownKeyword => "unknown-keyword",
            Self::MissingName => "missing-name",
            Self::MissingBody => "missing-body",
            Self::MalformedBody => "malformed-body",
            Self::DuplicateRegistration => "duplicate-registration",
            Self::UnexpectedToken => "unexpected-token",
            Self::UnexpectedEof => "unexpected-eof",
            Self::UnterminatedString => "unterminated-string",
            Self::UnterminatedComment => "unterminated-comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub span: Option<Span>,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Build a diagnostic whose severity follows from its kind
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            span: None,
            location: None,
        }
    }

    pub fn at(mut self, span: Span, location: SourceLocation) -> Self {
        self.span = Some(span);
        self.location = Some(location);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{}[{}] at {}: {}",
                self.severity,
                self.kind.code(),
                loc,
                self.message
            ),
            None => write!(f, "{}[{}]: {}", self.severity, self.kind.code(), self.message),
        }
    }
}

/// Ordered collection of diagnostics for one parse run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self { items }
    }
}

/// Format a diagnostic with the offending source line underneath
pub fn format_diagnostic(diagnostic: &Diagnostic, source: &str, file: Option<&str>) -> String {
    let mut msg = match (file, diagnostic.location) {
        // The file prefix already carries the location
        (Some(file), Some(loc)) => format!(
            "{}:{}: {}[{}]: {}",
            file,
            loc,
            diagnostic.severity,
            diagnostic.kind.code(),
            diagnostic.message
        ),
        (Some(file), None) => format!("{}: {}", file, diagnostic),
        (None, _) => diagnostic.to_string(),
    };

    if let Some(loc) = diagnostic.location {
        if let Some(line) = source.lines().nth(loc.line.saturating_sub(1)) {
            msg.push_str(&format!("\n  {:>4} | {}", loc.line, line));
            let width = diagnostic.span.map(|s| s.len()).unwrap_or(1).max(1);
            msg.push_str(&format!(
                "\n       | {}{}",
                " ".repeat(loc.column.saturating_sub(1)),
                "^".repeat(width)
            ));
        }
    }

    msg
}
