//! Persistent REPL session support.
//!
//! `ReplSession` keeps interpreter state across `execute()` calls so
//! interactive snippets share bindings: the interner, the prelude, and the
//! user's global frame all persist for the life of the session.

use crate::{
    env::Env,
    eval::{self, Interp},
    intern::Interner,
    io::PrintWriter,
    object::Object,
    parse::parse,
    registry::install_prelude,
    repl_error::ReplError,
    resource::ResourceLimits,
    tracer::{EvalTracer, NoopTracer},
    value::Value,
};

/// A persistent session that executes code against accumulated state.
///
/// # Example
/// ```
/// use triad::{NoPrint, Object, ReplSession};
///
/// let mut session = ReplSession::new();
/// session.execute("a := 41", &mut NoPrint).unwrap();
/// let result = session.execute(".$a + 1", &mut NoPrint).unwrap();
/// assert_eq!(result, Object::int(42));
/// ```
pub struct ReplSession {
    interner: Interner,
    env: Env,
    limits: ResourceLimits,
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplSession {
    /// Creates a session with the full prelude installed.
    ///
    /// User bindings land in a child frame above the prelude, so shadowing
    /// a builtin never destroys it for a later fresh session.
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let prelude = Env::root();
        install_prelude(&mut interner, &prelude);
        Self {
            interner,
            env: Env::child(&prelude),
            limits: ResourceLimits::none(),
        }
    }

    /// Applies resource limits to every subsequent `execute` call.
    #[must_use]
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Parses and reduces one source snippet against the session state.
    ///
    /// Every execution is wrapped in the root and `"error"` delimiters, so
    /// an uncaught reified failure comes back as [`Object::Error`] rather
    /// than an `Err`.
    pub fn execute(&mut self, source: &str, writer: &mut impl PrintWriter) -> Result<Object, ReplError> {
        let mut tracer = NoopTracer;
        self.execute_traced(source, writer, &mut tracer)
    }

    /// Like [`ReplSession::execute`], with an explicit tracer.
    pub fn execute_traced(
        &mut self,
        source: &str,
        writer: &mut impl PrintWriter,
        tracer: &mut dyn EvalTracer,
    ) -> Result<Object, ReplError> {
        let value = self.execute_value(source, writer, tracer)?;
        Ok(Object::from_value(&value, &self.interner))
    }

    /// The rendered printed form of evaluating `source`.
    pub fn execute_rendered(&mut self, source: &str, writer: &mut impl PrintWriter) -> Result<String, ReplError> {
        let mut tracer = NoopTracer;
        let value = self.execute_value(source, writer, &mut tracer)?;
        Ok(value.render(&self.interner))
    }

    fn execute_value(
        &mut self,
        source: &str,
        writer: &mut impl PrintWriter,
        tracer: &mut dyn EvalTracer,
    ) -> Result<Value, ReplError> {
        let tree = parse(source, &mut self.interner).map_err(|err| ReplError::classify(err, source))?;
        let mut interp = Interp {
            interner: &mut self.interner,
            writer,
            tracer,
            limits: self.limits,
        };
        eval::execute(&mut interp, tree, &self.env).map_err(|err| ReplError::classify(err, source))
    }
}
