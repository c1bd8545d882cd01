//! Runtime error kinds, the `RunError` carrier, and caret diagnostics.
//!
//! Errors fall into two families with different propagation rules:
//!
//! * **Reifiable** errors (anything a native operation can raise: type
//!   mismatches, division by zero, bad indices, I/O failures) are caught once
//!   by the reducer and rewritten into a language-level `shift "error"` so
//!   user code can intercept them with `reset "error" [...]`.
//! * **Structural** errors (`CantReduce`, `NoDispatch`, unmatched `shift`,
//!   resource limits, lex/parse failures) terminate the current execution
//!   and surface as a formatted diagnostic.

use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::lex::Span;

/// Result type alias for operations that can produce a runtime error.
pub(crate) type RunResult<T> = Result<T, RunError>;

/// The kind of a runtime error.
///
/// The string representation matches the variant name exactly and is what
/// diagnostics print (e.g. `NoDispatch: ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ExcKind {
    /// The lexer rejected the input.
    Lex,
    /// The parser rejected the token stream.
    Parse,
    /// The reducer reached a head no rule applies to.
    CantReduce,
    /// Operator dispatch found no operation for the operand types.
    NoDispatch,
    /// An operand had the wrong type for a native operation.
    TypeError,
    /// Integer division or modulo by zero.
    ZeroDivision,
    /// A `$` lookup failed and no fallback applied.
    NameError,
    /// A native operation rejected an operand's value.
    ValueError,
    /// An index or slice was out of bounds.
    IndexError,
    /// A file could not be read (`load` / `import` / `jsoneach`).
    IoError,
    /// A line passed to `jsoneach` was not a JSON object.
    JsonError,
    /// A `shift tag` found no matching `reset tag` delimiter.
    UnmatchedShift,
    /// A resource limit was exceeded during reduction.
    Resource,
}

impl ExcKind {
    /// Whether an error of this kind is rewritten into `shift "error"` so
    /// user code can intercept it, as opposed to terminating the execution.
    #[must_use]
    pub fn is_reifiable(self) -> bool {
        matches!(
            self,
            Self::TypeError
                | Self::ZeroDivision
                | Self::NameError
                | Self::ValueError
                | Self::IndexError
                | Self::IoError
                | Self::JsonError
        )
    }
}

/// A runtime error with kind, message, and optional witness span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    kind: ExcKind,
    message: String,
    span: Option<Span>,
}

impl RunError {
    pub(crate) fn new(kind: ExcKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Attaches a witness span if none is present yet.
    ///
    /// The first span wins: inner operations know the most precise location.
    #[must_use]
    pub(crate) fn with_span(mut self, span: Option<Span>) -> Self {
        if self.span.is_none() {
            self.span = span;
        }
        self
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExcKind::TypeError, message)
    }

    pub(crate) fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExcKind::ValueError, message)
    }

    /// The error kind.
    #[must_use]
    pub fn kind(&self) -> ExcKind {
        self.kind
    }

    /// The human-readable message, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The witness span, when one was attached.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Renders a diagnostic with the offending source line and a caret
    /// underline below the witness span.
    ///
    /// Falls back to the plain `kind: message` form when the error carries no
    /// span or the span does not point into `source`.
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let Some(span) = self.span else {
            return self.to_string();
        };
        let Some(line_text) = source.lines().nth(span.line.saturating_sub(1)) else {
            return self.to_string();
        };
        // Byte offset of the line start, to place the caret column.
        let line_start = source
            .lines()
            .take(span.line.saturating_sub(1))
            .map(|l| l.len() + 1)
            .sum::<usize>();
        let col = span.start.saturating_sub(line_start);
        let width = span.end.saturating_sub(span.start).max(1);
        let mut out = String::new();
        out.push_str(&format!("{self}\n"));
        out.push_str(&format!("  --> line {}\n", span.line));
        out.push_str(&format!("   | {line_text}\n"));
        out.push_str(&format!("   | {}{}", " ".repeat(col), "^".repeat(width)));
        out
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RunError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        let err = RunError::new(ExcKind::NoDispatch, "can't dispatch + on L: STRING");
        assert_eq!(err.to_string(), "NoDispatch: can't dispatch + on L: STRING");
    }

    #[test]
    fn render_underlines_witness_span() {
        let source = "1 + 2\n3 / 0\n";
        let err = RunError::new(ExcKind::ZeroDivision, "integer division by zero")
            .with_span(Some(Span::new(8, 11, 2)));
        let rendered = err.render(source);
        assert!(rendered.contains("3 / 0"), "diagnostic should quote the line: {rendered}");
        assert!(rendered.contains("^^^"), "diagnostic should underline the span: {rendered}");
    }

    #[test]
    fn render_without_span_is_plain() {
        let err = RunError::new(ExcKind::CantReduce, "can't reduce head");
        assert_eq!(err.render("whatever"), "CantReduce: can't reduce head");
    }
}
