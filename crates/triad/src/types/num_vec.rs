//! The `num_vec` module: lists of integers.
//!
//! A `num_vec` is what `tonumvec` produces from an all-numeric vec; it
//! supports elementwise arithmetic against a `NUM` right operand and the
//! usual reductions directly on numbers.

use crate::{
    env::Env,
    error::{ExcKind, RunError, RunResult},
    eval::Interp,
    intern::Interner,
    registry::Registry,
    types::num::Number,
    value::{Payload, Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::NUM_VEC, "+", Some(Tag::NUM), add);
    registry.register(interner, Tag::NUM_VEC, "-", Some(Tag::NUM), sub);
    registry.register(interner, Tag::NUM_VEC, "*", Some(Tag::NUM), mul);
    registry.register(interner, Tag::NUM_VEC, "/", Some(Tag::NUM), div);
    registry.register(interner, Tag::NUM_VEC, "len", None, len);
    registry.register(interner, Tag::NUM_VEC, "at", None, at);
    registry.register(interner, Tag::NUM_VEC, "sum", None, sum);
    registry.register(interner, Tag::NUM_VEC, "fold", None, fold);
    registry.register(interner, Tag::NUM_VEC, "scan", None, scan);
    registry.register(interner, Tag::NUM_VEC, "tovec", None, to_vec);
}

pub(crate) fn expect_num_vec<'v>(value: &'v Value, context: &str) -> RunResult<&'v [Number]> {
    match value.payload() {
        Some(Payload::NumVec(items)) => Ok(items),
        _ => Err(RunError::type_error(format!("{context} expects a num_vec operand")).with_span(value.span())),
    }
}

fn elementwise(
    a: &Value,
    b: &Value,
    context: &str,
    op: fn(&Number, &Number) -> RunResult<Number>,
) -> RunResult<Value> {
    let items = expect_num_vec(a, context)?;
    let n = b.expect_num(context)?;
    let out = items.iter().map(|x| op(x, n)).collect::<RunResult<Vec<_>>>()?;
    Ok(Value::num_vec(out))
}

fn add(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "+", Number::add)
}

fn sub(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "-", Number::sub)
}

fn mul(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "*", Number::mul)
}

fn div(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "/", Number::div)
}

fn len(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num(Number::from_usize(expect_num_vec(a, "len")?.len())))
}

fn at(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let items = expect_num_vec(a, "at")?;
    let index = b.expect_num("at")?.to_index()?;
    items.get(index).cloned().map(Value::num).ok_or_else(|| {
        RunError::new(
            ExcKind::IndexError,
            format!("index {index} out of bounds for a num_vec of {}", items.len()),
        )
        .with_span(b.span())
    })
}

fn sum(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let mut acc = Number::from_i64(0);
    for n in expect_num_vec(a, "sum")? {
        acc = acc.add(n)?;
    }
    Ok(Value::num(acc))
}

/// Resolves the named arithmetic operation used by `fold` / `scan`.
fn number_op(interp: &mut Interp, op: &Value) -> RunResult<fn(&Number, &Number) -> RunResult<Number>> {
    let name = match op.payload() {
        Some(Payload::Str(text)) => text.to_string(),
        Some(Payload::Symbol(id) | Payload::Punctuation(id)) => interp.interner.resolve(*id).to_owned(),
        _ => return Err(RunError::type_error("expected an operation name").with_span(op.span())),
    };
    match name.as_str() {
        "+" => Ok(Number::add),
        "-" => Ok(Number::sub),
        "*" => Ok(Number::mul),
        "/" => Ok(Number::div),
        "min" => Ok(|a, b| Ok(a.clone().min(b.clone()))),
        "max" => Ok(|a, b| Ok(a.clone().max(b.clone()))),
        other => Err(RunError::value_error(format!("{other} is not a num_vec operation")).with_span(op.span())),
    }
}

fn fold(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let items = expect_num_vec(a, "fold")?.to_vec();
    let op = number_op(interp, b)?;
    let mut iter = items.iter();
    let Some(first) = iter.next() else {
        return Ok(Value::unit());
    };
    let mut acc = first.clone();
    for n in iter {
        acc = op(&acc, n)?;
    }
    Ok(Value::num(acc))
}

fn scan(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let items = expect_num_vec(a, "scan")?.to_vec();
    let op = number_op(interp, b)?;
    let mut out = Vec::with_capacity(items.len());
    let mut iter = items.iter();
    let Some(first) = iter.next() else {
        return Ok(Value::num_vec(out));
    };
    let mut acc = first.clone();
    out.push(acc.clone());
    for n in iter {
        acc = op(&acc, n)?;
        out.push(acc.clone());
    }
    Ok(Value::num_vec(out))
}

fn to_vec(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::vec(
        expect_num_vec(a, "tovec")?.iter().cloned().map(Value::num).collect(),
    ))
}
