//! One-shot batch execution.

use crate::{
    io::{PrintWriter, StdPrint},
    object::Object,
    repl::ReplSession,
    repl_error::ReplError,
    resource::ResourceLimits,
};

/// Primary interface for running a whole program to completion.
///
/// Every `run` builds a fresh session: batch executions do not share state
/// with each other.
///
/// # Example
/// ```
/// use triad::{NoPrint, Object, Runner};
///
/// let runner = Runner::new("1 + 2 * 3");
/// assert_eq!(runner.run(&mut NoPrint).unwrap(), Object::int(9));
/// ```
pub struct Runner {
    source: String,
    limits: ResourceLimits,
}

impl Runner {
    /// Creates a runner for `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            limits: ResourceLimits::none(),
        }
    }

    /// Applies resource limits to the execution.
    #[must_use]
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The source this runner executes.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Runs the program and returns the final reduced value.
    pub fn run(&self, writer: &mut impl PrintWriter) -> Result<Object, ReplError> {
        let mut session = ReplSession::new().with_limits(self.limits);
        session.execute(&self.source, writer)
    }

    /// Runs with print output going to stdout.
    pub fn run_stdout(&self) -> Result<Object, ReplError> {
        self.run(&mut StdPrint)
    }
}
