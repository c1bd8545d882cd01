//! The `STRING` and `SYMBOL` modules.
//!
//! Strings are UTF-8; positional operations count characters, not bytes.

use std::cmp::Ordering;

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
    registry.register(interner, Tag::STRING, "++", None, concat);
    registry.register(interner, Tag::STRING, "len", None, len);
    registry.register(interner, Tag::STRING, "at", None, at);
    registry.register(interner, Tag::STRING, "take", None, take);
    registry.register(interner, Tag::STRING, "drop", None, drop_op);
    registry.register(interner, Tag::STRING, "<", None, less);
    registry.register(interner, Tag::STRING, ">", None, greater);
    registry.register(interner, Tag::STRING, "tosym", None, to_symbol);
    registry.register(interner, Tag::STRING, "tonum", None, to_num);

    registry.register(interner, Tag::SYMBOL, "tostr", None, symbol_to_str);
}

fn concat(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let mut out = a.expect_str("++")?.to_owned();
    out.push_str(b.expect_str("++")?);
    Ok(Value::string(out))
}

fn len(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num(Number::from_usize(a.expect_str("len")?.chars().count())))
}

fn at(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let text = a.expect_str("at")?;
    let index = b.expect_num("at")?.to_index()?;
    match text.chars().nth(index) {
        Some(c) => Ok(Value::string(c.to_string())),
        None => Err(RunError::new(
            crate::error::ExcKind::IndexError,
            format!("index {index} out of bounds for a string of {} characters", text.chars().count()),
        )
        .with_span(b.span())),
    }
}

fn take(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let text = a.expect_str("take")?;
    let n = b.expect_num("take")?.to_index()?;
    Ok(Value::string(text.chars().take(n).collect::<String>()))
}

fn drop_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let text = a.expect_str("drop")?;
    let n = b.expect_num("drop")?.to_index()?;
    Ok(Value::string(text.chars().skip(n).collect::<String>()))
}

fn compare(a: &Value, b: &Value, op: &str) -> RunResult<Ordering> {
    Ok(a.expect_str(op)?.cmp(b.expect_str(op)?))
}

fn less(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(compare(a, b, "<")? == Ordering::Less))
}

fn greater(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(compare(a, b, ">")? == Ordering::Greater))
}

fn to_symbol(interp: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let name = interp.interner.intern(a.expect_str("tosym")?);
    Ok(Value::symbol(name))
}

/// Parses a string into a `NUM` using the literal rules of source text
/// (`_` prefix negation, `_` separators, lone `_`/`__` infinities).
fn to_num(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let text = a.expect_str("tonum")?;
    let number = match text {
        "_" => Some(Number::INF),
        "__" => Some(Number::NEG_INF),
        _ => {
            let negative = text.starts_with('_') || text.starts_with('-');
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() || !text.chars().all(|c| c.is_ascii_digit() || c == '_' || c == '-') {
                None
            } else {
                Number::from_digits(&digits).map(|n| if negative { -n } else { n })
            }
        }
    };
    number
        .map(Value::num)
        .ok_or_else(|| RunError::value_error(format!("{text:?} is not a number")).with_span(a.span()))
}

fn symbol_to_str(interp: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    match a.payload() {
        Some(Payload::Symbol(id)) => Ok(Value::string(interp.interner.resolve(*id).to_owned())),
        _ => Err(RunError::type_error("tostr expects a SYMBOL operand").with_span(a.span())),
    }
}
