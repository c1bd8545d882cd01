//! The `OBJECT` and `NATIVE_OBJECT` modules.
//!
//! An `OBJECT` wraps an environment used as a record and dispatch module;
//! `@` reads a slot by symbol and writes through a `name : value` cons.
//! A `NATIVE_OBJECT` wraps a parsed JSON object (from `jsoneach`) and is
//! read-only; its fields convert to language values on access.

use num_bigint::BigInt;

use crate::{
    env::Env,
    error::{ExcKind, RunError, RunResult},
    eval::{Interp, bool_num, is_cons_tree},
    intern::Interner,
    registry::Registry,
    types::num::Number,
    value::{JsonMap, Payload, Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::OBJECT, "@", None, object_at);
    registry.register(interner, Tag::OBJECT, "keys", None, object_keys);
    registry.register(interner, Tag::OBJECT, "has", None, object_has);

    registry.register(interner, Tag::NATIVE_OBJECT, "@", None, native_at);
    registry.register(interner, Tag::NATIVE_OBJECT, "keys", None, native_keys);
    registry.register(interner, Tag::NATIVE_OBJECT, "has", None, native_has);
}

fn expect_object<'v>(value: &'v Value, context: &str) -> RunResult<&'v Env> {
    match value.payload() {
        Some(Payload::Object(env)) => Ok(env),
        _ => Err(RunError::type_error(format!("{context} expects an OBJECT operand")).with_span(value.span())),
    }
}

fn expect_native<'v>(value: &'v Value, context: &str) -> RunResult<&'v JsonMap> {
    match value.payload() {
        Some(Payload::Native(map)) => Ok(map),
        _ => Err(RunError::type_error(format!("{context} expects a NATIVE_OBJECT operand")).with_span(value.span())),
    }
}

/// `obj @ name` reads a slot; `obj @ (name : value)` writes one and yields
/// the object for chaining.
fn object_at(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let object = expect_object(a, "@")?;
    if let Some(pair) = b.as_tree().filter(|t| is_cons_tree(t)) {
        let Some(name) = pair.left.name(interp.interner) else {
            return Err(RunError::type_error("@ write expects a symbol slot name").with_span(pair.left.span()));
        };
        object.bind(name, pair.right.clone());
        return Ok(a.clone());
    }
    let Some(name) = b.name(interp.interner) else {
        return Err(RunError::type_error("@ expects a slot name or a `name : value` pair").with_span(b.span()));
    };
    object.lookup(name).ok_or_else(|| {
        let text = interp.interner.resolve(name).to_owned();
        RunError::new(ExcKind::NameError, format!("object has no slot {text}")).with_span(b.span())
    })
}

fn object_keys(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let object = expect_object(a, "keys")?;
    Ok(Value::vec(object.local_names().into_iter().map(Value::symbol).collect()))
}

fn object_has(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let object = expect_object(a, "has")?;
    let Some(name) = b.name(interp.interner) else {
        return Err(RunError::type_error("has expects a slot name").with_span(b.span()));
    };
    Ok(bool_num(object.lookup(name).is_some()))
}

/// Converts a JSON value into a language value. Booleans become `NUM` 0/1,
/// nested objects stay native; non-integer numbers are rejected (the
/// language has no floats).
pub(crate) fn json_to_value(json: &serde_json::Value) -> RunResult<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::unit()),
        serde_json::Value::Bool(b) => Ok(bool_num(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::num(Number::Int(BigInt::from(i))))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::num(Number::Int(BigInt::from(u))))
            } else {
                Err(RunError::value_error(format!("{n} is not an integer")))
            }
        }
        serde_json::Value::String(s) => Ok(Value::string(s.as_str())),
        serde_json::Value::Array(items) => Ok(Value::vec(
            items.iter().map(json_to_value).collect::<RunResult<Vec<_>>>()?,
        )),
        serde_json::Value::Object(map) => Ok(Value::leaf(Payload::Native(map.clone().into()), None)),
    }
}

fn native_at(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let map = expect_native(a, "@")?;
    let Some(name) = b.name(interp.interner) else {
        return Err(RunError::type_error("@ expects a field name").with_span(b.span()));
    };
    let key = interp.interner.resolve(name);
    match map.get(key) {
        Some(json) => json_to_value(json),
        None => Err(RunError::new(ExcKind::NameError, format!("no field {key}")).with_span(b.span())),
    }
}

fn native_keys(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let map = expect_native(a, "keys")?;
    Ok(Value::vec(map.keys().map(|k| Value::string(k.as_str())).collect()))
}

fn native_has(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let map = expect_native(a, "has")?;
    let Some(name) = b.name(interp.interner) else {
        return Err(RunError::type_error("has expects a field name").with_span(b.span()));
    };
    Ok(bool_num(map.contains_key(interp.interner.resolve(name))))
}
