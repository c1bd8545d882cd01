//! The `num_set` module: insertion-ordered sets of integers.
//!
//! Sets are immutable like every non-object value; `put` and `del` return
//! new sets.

use indexmap::IndexSet;

use crate::{
    env::Env,
    error::{RunError, RunResult},
    eval::{Interp, bool_num},
    intern::Interner,
    registry::Registry,
    types::num::Number,
    value::{Payload, Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::NUM_SET, "has", None, has);
    registry.register(interner, Tag::NUM_SET, "put", None, put);
    registry.register(interner, Tag::NUM_SET, "del", None, del);
    registry.register(interner, Tag::NUM_SET, "len", None, len);
    registry.register(interner, Tag::NUM_SET, "tovec", None, to_vec);
}

fn expect_set<'v>(value: &'v Value, context: &str) -> RunResult<&'v IndexSet<Number>> {
    match value.payload() {
        Some(Payload::NumSet(items)) => Ok(items),
        _ => Err(RunError::type_error(format!("{context} expects a num_set operand")).with_span(value.span())),
    }
}

fn has(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(expect_set(a, "has")?.contains(b.expect_num("has")?)))
}

fn put(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let mut items = expect_set(a, "put")?.clone();
    items.insert(b.expect_num("put")?.clone());
    Ok(Value::num_set(items))
}

fn del(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let mut items = expect_set(a, "del")?.clone();
    items.shift_remove(b.expect_num("del")?);
    Ok(Value::num_set(items))
}

fn len(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num(Number::from_usize(expect_set(a, "len")?.len())))
}

fn to_vec(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::vec(
        expect_set(a, "tovec")?.iter().cloned().map(Value::num).collect(),
    ))
}
