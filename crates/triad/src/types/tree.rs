//! The `TREE` module: structural access to cons trees.

use crate::{
    env::Env,
    error::{RunError, RunResult},
    eval::Interp,
    intern::Interner,
    registry::Registry,
    value::{Tag, Value},
};

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::TREE, "L", None, left_child);
    registry.register(interner, Tag::TREE, "H", None, head_child);
    registry.register(interner, Tag::TREE, "R", None, right_child);
}

pub(crate) fn left_child(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    child(a, "L").map(|(l, _, _)| l)
}

pub(crate) fn head_child(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    child(a, "H").map(|(_, h, _)| h)
}

pub(crate) fn right_child(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    child(a, "R").map(|(_, _, r)| r)
}

fn child(value: &Value, context: &str) -> RunResult<(Value, Value, Value)> {
    let tree = value
        .as_tree()
        .ok_or_else(|| RunError::type_error(format!("{context} expects a tree")).with_span(value.span()))?;
    Ok((tree.left.clone(), tree.head.clone(), tree.right.clone()))
}
