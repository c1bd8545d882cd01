//! Resource limits for the reduction loop.
//!
//! Embedders can bound a runaway program by limiting the number of
//! reduction steps and the cactus-stack depth. Exceeding a limit terminates
//! the current execution with a `Resource` error; it is not catchable from
//! inside the language.

use crate::error::{ExcKind, RunError, RunResult};

/// Limits applied to one execution. [`ResourceLimits::none`] disables all
/// checking.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceLimits {
    max_steps: Option<u64>,
    max_depth: Option<usize>,
}

impl ResourceLimits {
    /// No limits: the reducer runs until it finishes.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Limits the number of reduction-loop iterations.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Limits the number of live continuation frames.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub(crate) fn check(&self, steps: u64, depth: usize) -> RunResult<()> {
        if let Some(limit) = self.max_steps
            && steps > limit
        {
            return Err(RunError::new(
                ExcKind::Resource,
                format!("step limit exceeded: {steps} > {limit}"),
            ));
        }
        if let Some(limit) = self.max_depth
            && depth > limit
        {
            return Err(RunError::new(
                ExcKind::Resource,
                format!("stack depth limit exceeded: {depth} > {limit}"),
            ));
        }
        Ok(())
    }
}
