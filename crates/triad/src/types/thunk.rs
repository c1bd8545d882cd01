//! The `THUNK`, `FUNTHUNK`, and `FUNCTION` modules.
//!
//! `func` is the promotion the reducer's delayed-promotion rewrite relies
//! on: a `FUNTHUNK` head becomes `({body} func ())` and lands here.

use crate::{
    env::Env,
    error::{RunError, RunResult},
    eval::{Interp, make_function},
    intern::Interner,
    registry::Registry,
    value::{Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::THUNK, "func", None, promote);
    registry.register(interner, Tag::THUNK, "open", None, open);

    registry.register(interner, Tag::FUNTHUNK, "func", None, promote);
    registry.register(interner, Tag::FUNTHUNK, "open", None, open);

    registry.register(interner, Tag::FUNCTION, "func", None, promote);
    registry.register(interner, Tag::FUNCTION, "open", None, open);
}

pub(crate) fn promote(_: &mut Interp, a: &Value, _: &Value, env: &Env) -> RunResult<Value> {
    make_function(a, env)
}

fn open(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    a.unwrap_wrapped()
        .ok_or_else(|| RunError::type_error("open expects a wrapped value").with_span(a.span()))
}

