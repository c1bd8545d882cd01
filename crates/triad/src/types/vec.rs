//! The `vec` module: heterogeneous lists.
//!
//! Vecs are built with the ambient `,` operator and are immutable; every
//! operation returns a fresh value. Operations that take an operation
//! operand (`fold`, `scan`, `each`, `choose`) accept either a name, which
//! resolves through normal dispatch per element, or a function value.

use std::cmp::Ordering;

use indexmap::IndexSet;

use crate::{
    env::Env,
    error::{ExcKind, RunError, RunResult},
    eval::{Interp, apply_operation, truthy},
    intern::{Interner, StaticNames},
    registry::Registry,
    types::num::Number,
    value::{Payload, Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::VEC, "len", None, len);
    registry.register(interner, Tag::VEC, "at", None, at);
    registry.register(interner, Tag::VEC, "take", None, take);
    registry.register(interner, Tag::VEC, "drop", None, drop_op);
    registry.register(interner, Tag::VEC, "++", None, concat);
    registry.register(interner, Tag::VEC, "fold", None, fold);
    registry.register(interner, Tag::VEC, "scan", None, scan);
    registry.register(interner, Tag::VEC, "each", None, each);
    registry.register(interner, Tag::VEC, "zip", None, zip);
    registry.register(interner, Tag::VEC, "order", None, order);
    registry.register(interner, Tag::VEC, "choose", None, choose);
    registry.register(interner, Tag::VEC, "tonumvec", None, to_num_vec);
    registry.register(interner, Tag::VEC, "toset", None, to_set);
}

fn len(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num(Number::from_usize(a.expect_vec("len")?.len())))
}

fn at(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let items = a.expect_vec("at")?;
    let index = b.expect_num("at")?.to_index()?;
    items.get(index).cloned().ok_or_else(|| {
        RunError::new(
            ExcKind::IndexError,
            format!("index {index} out of bounds for a vec of {}", items.len()),
        )
        .with_span(b.span())
    })
}

fn take(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let items = a.expect_vec("take")?;
    let n = b.expect_num("take")?.to_index()?;
    Ok(Value::vec(items.iter().take(n).cloned().collect()))
}

fn drop_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let items = a.expect_vec("drop")?;
    let n = b.expect_num("drop")?.to_index()?;
    Ok(Value::vec(items.iter().skip(n).cloned().collect()))
}

fn concat(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let mut items = (**a.expect_vec("++")?).clone();
    items.extend(b.expect_vec("++")?.iter().cloned());
    Ok(Value::vec(items))
}

/// `v fold op`: left fold; the first element seeds the accumulator. An
/// empty vec folds to `UNIT`.
fn fold(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let items = a.expect_vec("fold")?.clone();
    let mut iter = items.iter();
    let Some(first) = iter.next() else {
        return Ok(Value::unit());
    };
    let mut acc = first.clone();
    for item in iter {
        acc = apply_operation(interp, env, acc, b, item.clone())?;
    }
    Ok(acc)
}

/// `v scan op`: like `fold` but keeps every intermediate accumulator.
fn scan(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let items = a.expect_vec("scan")?.clone();
    let mut out = Vec::with_capacity(items.len());
    let mut iter = items.iter();
    let Some(first) = iter.next() else {
        return Ok(Value::vec(out));
    };
    let mut acc = first.clone();
    out.push(acc.clone());
    for item in iter {
        acc = apply_operation(interp, env, acc, b, item.clone())?;
        out.push(acc.clone());
    }
    Ok(Value::vec(out))
}

/// `v each op`: applies the operation to every element.
fn each(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let items = a.expect_vec("each")?.clone();
    let mut out = Vec::with_capacity(items.len());
    for item in items.iter() {
        out.push(apply_operation(interp, env, item.clone(), b, Value::unit())?);
    }
    Ok(Value::vec(out))
}

/// `v zip w`: pairs elements positionally into `a : b` cons trees,
/// stopping at the shorter operand.
fn zip(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let left = a.expect_vec("zip")?;
    let right = b.expect_vec("zip")?;
    let colon = StaticNames::Colon.id();
    let out = left
        .iter()
        .zip(right.iter())
        .map(|(x, y)| Value::tree(x.clone(), Value::punctuation(colon), y.clone(), None))
        .collect();
    Ok(Value::vec(out))
}

/// Comparison used by `order`: numbers and strings, nothing mixed.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a.payload()?, b.payload()?) {
        (Payload::Num(x), Payload::Num(y)) => Some(x.cmp(y)),
        (Payload::Str(x), Payload::Str(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn order(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let mut items = (**a.expect_vec("order")?).clone();
    let mut incomparable = false;
    items.sort_by(|x, y| {
        compare(x, y).unwrap_or_else(|| {
            incomparable = true;
            Ordering::Equal
        })
    });
    if incomparable {
        return Err(RunError::type_error("order expects elements that compare (NUM or STRING)").with_span(a.span()));
    }
    Ok(Value::vec(items))
}

/// `v choose pred`: keeps the elements for which the predicate is truthy.
fn choose(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let items = a.expect_vec("choose")?.clone();
    let mut out = Vec::new();
    for item in items.iter() {
        let keep = apply_operation(interp, env, item.clone(), b, Value::unit())?;
        if truthy(&keep)? {
            out.push(item.clone());
        }
    }
    Ok(Value::vec(out))
}

fn expect_numbers(a: &Value, context: &str) -> RunResult<Vec<Number>> {
    a.expect_vec(context)?
        .iter()
        .map(|item| item.expect_num(context).cloned())
        .collect()
}

fn to_num_vec(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num_vec(expect_numbers(a, "tonumvec")?))
}

fn to_set(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num_set(expect_numbers(a, "toset")?.into_iter().collect::<IndexSet<_>>()))
}
