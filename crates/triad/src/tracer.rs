//! Reducer execution tracing.
//!
//! A trait-based hook system for observing the reduction loop. The default
//! [`NoopTracer`] does nothing and its calls disappear behind the vtable;
//! [`StderrTracer`] writes a human-readable step log; [`RecordingTracer`]
//! keeps events for post-mortem inspection in tests.

/// Trace event emitted during reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// An operator was dispatched against a left-operand type.
    Dispatch {
        /// Operator name.
        op: String,
        /// Type label of the left operand.
        left_type: String,
    },
    /// A user function was entered.
    Apply {
        /// Whether the call reused the topmost function frame.
        flattened: bool,
        /// Cactus depth after the call.
        depth: usize,
    },
    /// A `shift` captured a segment.
    Capture {
        /// The continuation tag.
        tag: String,
        /// Number of captured frames.
        frames: usize,
    },
    /// A continuation was resumed.
    Resume {
        /// The continuation tag.
        tag: String,
    },
}

/// Trait for reduction tracing.
///
/// All methods have default no-op implementations; implementations only
/// override the hooks they care about.
pub trait EvalTracer {
    /// Called when operator dispatch resolves an operation.
    fn on_dispatch(&mut self, _op: &str, _left_type: &str) {}

    /// Called when a user function is entered.
    fn on_apply(&mut self, _flattened: bool, _depth: usize) {}

    /// Called when `shift` captures a segment.
    fn on_capture(&mut self, _tag: &str, _frames: usize) {}

    /// Called when a continuation value is resumed.
    fn on_resume(&mut self, _tag: &str) {}
}

/// Zero-cost no-op tracer, the production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl EvalTracer for NoopTracer {}

/// Tracer that writes a human-readable log to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTracer;

impl EvalTracer for StderrTracer {
    fn on_dispatch(&mut self, op: &str, left_type: &str) {
        eprintln!("dispatch {op} on {left_type}");
    }

    fn on_apply(&mut self, flattened: bool, depth: usize) {
        if flattened {
            eprintln!("apply (tail, depth {depth})");
        } else {
            eprintln!("apply (depth {depth})");
        }
    }

    fn on_capture(&mut self, tag: &str, frames: usize) {
        eprintln!("shift {tag}: captured {frames} frame(s)");
    }

    fn on_resume(&mut self, tag: &str) {
        eprintln!("resume {tag}");
    }
}

/// Tracer that records every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events, in order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }
}

impl EvalTracer for RecordingTracer {
    fn on_dispatch(&mut self, op: &str, left_type: &str) {
        self.events.push(TraceEvent::Dispatch {
            op: op.to_owned(),
            left_type: left_type.to_owned(),
        });
    }

    fn on_apply(&mut self, flattened: bool, depth: usize) {
        self.events.push(TraceEvent::Apply { flattened, depth });
    }

    fn on_capture(&mut self, tag: &str, frames: usize) {
        self.events.push(TraceEvent::Capture {
            tag: tag.to_owned(),
            frames,
        });
    }

    fn on_resume(&mut self, tag: &str) {
        self.events.push(TraceEvent::Resume { tag: tag.to_owned() });
    }
}
