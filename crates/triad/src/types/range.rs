//! The `range` type: a `(lo, step, count)` triple of integers.
//!
//! Ranges are built with `lo range count` (step 1) and re-stepped with
//! `by`. Arithmetic against a `NUM` shifts the start (`+`/`-`) or scales
//! both start and step (`*`), keeping the range lazy; `tovec` and
//! `tonumvec` materialize it.

use crate::{
    env::Env,
    error::{RunError, RunResult},
    eval::{Interp, apply_operation},
    intern::Interner,
    registry::Registry,
    types::num::Number,
    value::{Payload, Tag, Value},
};

/// A lazy arithmetic progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RangeValue {
    pub lo: Number,
    pub step: Number,
    pub count: Number,
}

impl RangeValue {
    /// Materializes the progression. An infinite count is a value error.
    pub fn numbers(&self) -> RunResult<Vec<Number>> {
        let count = match &self.count {
            Number::Int(_) => self.count.to_index()?,
            _ => return Err(RunError::value_error("can't materialize an infinite range")),
        };
        let mut out = Vec::with_capacity(count);
        let mut current = self.lo.clone();
        for _ in 0..count {
            out.push(current.clone());
            current = current.add(&self.step)?;
        }
        Ok(out)
    }
}

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::NUM, "range", None, make_range);

    registry.register(interner, Tag::RANGE, "by", None, by);
    registry.register(interner, Tag::RANGE, "+", Some(Tag::NUM), shift_up);
    registry.register(interner, Tag::RANGE, "-", Some(Tag::NUM), shift_down);
    registry.register(interner, Tag::RANGE, "*", Some(Tag::NUM), scale);
    registry.register(interner, Tag::RANGE, "len", None, len);
    registry.register(interner, Tag::RANGE, "at", None, at);
    registry.register(interner, Tag::RANGE, "fold", None, fold);
    registry.register(interner, Tag::RANGE, "tovec", None, to_vec);
    registry.register(interner, Tag::RANGE, "tonumvec", None, to_num_vec);
}

fn expect_range<'v>(value: &'v Value, context: &str) -> RunResult<&'v RangeValue> {
    match value.payload() {
        Some(Payload::Range(range)) => Ok(range),
        _ => Err(RunError::type_error(format!("{context} expects a range operand")).with_span(value.span())),
    }
}

/// `lo range count`: a progression starting at `lo` with step 1.
fn make_range(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let lo = a.expect_num("range")?.clone();
    let count = b.expect_num("range")?.clone();
    Ok(Value::leaf(
        Payload::Range(RangeValue {
            lo,
            step: Number::from_i64(1),
            count,
        }),
        a.span(),
    ))
}

fn by(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let mut range = expect_range(a, "by")?.clone();
    range.step = b.expect_num("by")?.clone();
    Ok(Value::leaf(Payload::Range(range), a.span()))
}

fn shift(a: &Value, b: &Value, context: &str, down: bool) -> RunResult<Value> {
    let mut range = expect_range(a, context)?.clone();
    let n = b.expect_num(context)?;
    range.lo = if down { range.lo.sub(n)? } else { range.lo.add(n)? };
    Ok(Value::leaf(Payload::Range(range), a.span()))
}

fn shift_up(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    shift(a, b, "+", false)
}

fn shift_down(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    shift(a, b, "-", true)
}

fn scale(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let mut range = expect_range(a, "*")?.clone();
    let n = b.expect_num("*")?;
    range.lo = range.lo.mul(n)?;
    range.step = range.step.mul(n)?;
    Ok(Value::leaf(Payload::Range(range), a.span()))
}

fn len(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num(expect_range(a, "len")?.count.clone()))
}

fn at(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let range = expect_range(a, "at")?;
    let index = b.expect_num("at")?;
    if matches!(&range.count, Number::Int(_)) && index >= &range.count {
        return Err(RunError::new(
            crate::error::ExcKind::IndexError,
            format!("index {index} out of bounds for a range of {}", range.count),
        )
        .with_span(b.span()));
    }
    Ok(Value::num(range.lo.add(&range.step.mul(index)?)?))
}

/// `r fold op`: materializes the progression and folds left; the first
/// element seeds the accumulator. An empty range folds to `UNIT`.
fn fold(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let numbers = expect_range(a, "fold")?.numbers()?;
    let mut iter = numbers.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Value::unit());
    };
    let mut acc = Value::num(first);
    for n in iter {
        acc = apply_operation(interp, env, acc, b, Value::num(n))?;
    }
    Ok(acc)
}

fn to_vec(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::vec(
        expect_range(a, "tovec")?.numbers()?.into_iter().map(Value::num).collect(),
    ))
}

fn to_num_vec(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num_vec(expect_range(a, "tonumvec")?.numbers()?))
}
