//! The `pointer` type: a shared mutable cell.
//!
//! `v pointer ()` wraps a value through the module's constructor slot;
//! `get` reads the cell and `set` overwrites it in place, which makes
//! pointers (besides objects) the only way to share mutable state between
//! closures.

use std::{cell::RefCell, rc::Rc};

use crate::{
    env::Env,
    error::{RunError, RunResult},
    eval::Interp,
    intern::Interner,
    registry::Registry,
    value::{Payload, Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::POINTER, ".", None, construct);
    registry.register(interner, Tag::POINTER, "get", None, get);
    registry.register(interner, Tag::POINTER, "set", None, set);
}

fn expect_pointer<'v>(value: &'v Value, context: &str) -> RunResult<&'v Rc<RefCell<Value>>> {
    match value.payload() {
        Some(Payload::Pointer(cell)) => Ok(cell),
        _ => Err(RunError::type_error(format!("{context} expects a pointer operand")).with_span(value.span())),
    }
}

fn construct(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::leaf(Payload::Pointer(Rc::new(RefCell::new(a.clone()))), a.span()))
}

fn get(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(expect_pointer(a, "get")?.borrow().clone())
}

/// `p set v`: overwrite the cell, yielding the pointer.
fn set(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    *expect_pointer(a, "set")?.borrow_mut() = b.clone();
    Ok(a.clone())
}
