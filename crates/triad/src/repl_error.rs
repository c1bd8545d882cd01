//! Error type for REPL and runner execution, separating failures by
//! pipeline stage.
//!
//! Keeping lex/parse failures distinct from reducer failures lets callers
//! pick recovery policies without string matching. Both carry a rendered
//! diagnostic (source line plus caret underline) ready for display.

use std::fmt;

use crate::error::RunError;

/// Error from executing one source snippet.
#[derive(Debug, Clone)]
pub enum ReplError {
    /// Lexing or parsing rejected the input.
    Parse {
        /// The underlying error.
        error: RunError,
        /// Rendered diagnostic with source excerpt.
        diagnostic: String,
    },
    /// The reducer failed structurally (`CantReduce`, `NoDispatch`,
    /// unmatched `shift`, resource limits).
    Runtime {
        /// The underlying error.
        error: RunError,
        /// Rendered diagnostic with source excerpt.
        diagnostic: String,
    },
}

impl ReplError {
    pub(crate) fn classify(error: RunError, source: &str) -> Self {
        let diagnostic = error.render(source);
        match error.kind() {
            crate::error::ExcKind::Lex | crate::error::ExcKind::Parse => Self::Parse { error, diagnostic },
            _ => Self::Runtime { error, diagnostic },
        }
    }

    /// The underlying error.
    #[must_use]
    pub fn error(&self) -> &RunError {
        match self {
            Self::Parse { error, .. } | Self::Runtime { error, .. } => error,
        }
    }
}

impl fmt::Display for ReplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { diagnostic, .. } | Self::Runtime { diagnostic, .. } => {
                write!(f, "{diagnostic}")
            }
        }
    }
}

impl std::error::Error for ReplError {}
