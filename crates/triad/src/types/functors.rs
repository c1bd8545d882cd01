//! The user functors: `Some`, `true`, `false`, and the `UNIT` monadic
//! operations.
//!
//! Functor values are tagged boxes built through their module's `.`
//! constructor slot: `42 Some ()` boxes 42, `() true ()` is the bare truth
//! value. `>>=` on `Some` applies the right operand to the boxed payload;
//! on `UNIT` it short-circuits, which is what makes `UNIT` the "nothing"
//! of the maybe chain.

use crate::{
    env::Env,
    error::{RunError, RunResult},
    eval::{Interp, bool_num},
    intern::Interner,
    registry::Registry,
    value::{Payload, Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::SOME, ".", None, construct_some);
    registry.register(interner, Tag::SOME, "|", None, some_bind);
    registry.register(interner, Tag::SOME, ">>=", None, some_bind);
    registry.register(interner, Tag::SOME, "open", None, some_open);

    registry.register(interner, Tag::UNIT, "|", None, unit_absorb);
    registry.register(interner, Tag::UNIT, ">>=", None, unit_absorb);

    registry.register(interner, Tag::TRUE, ".", None, construct_true);
    registry.register(interner, Tag::TRUE, "not", None, true_not);
    registry.register(interner, Tag::FALSE, ".", None, construct_false);
    registry.register(interner, Tag::FALSE, "not", None, false_not);
}

fn construct_some(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::boxed(Tag::SOME, a.clone()))
}

/// `Some x >>= f`: unbox and apply `f` to the payload. The returned
/// application tree continues reducing in place.
fn some_bind(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let Some(Payload::Boxed(_, payload)) = a.payload() else {
        return Err(RunError::type_error(">>= expects a Some operand").with_span(a.span()));
    };
    Ok(Value::tree(payload.clone(), b.clone(), Value::unit(), a.span()))
}

fn some_open(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    match a.payload() {
        Some(Payload::Boxed(_, payload)) => Ok(payload.clone()),
        _ => Err(RunError::type_error("open expects a Some operand").with_span(a.span())),
    }
}

/// `() >>= f`: nothing stays nothing.
fn unit_absorb(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(a.clone())
}

fn construct_true(_: &mut Interp, _: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::boxed(Tag::TRUE, Value::unit()))
}

fn construct_false(_: &mut Interp, _: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::boxed(Tag::FALSE, Value::unit()))
}

fn true_not(_: &mut Interp, _: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(false))
}

fn false_not(_: &mut Interp, _: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(true))
}
