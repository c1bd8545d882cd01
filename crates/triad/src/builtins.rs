//! Ambient operations: the natives bound directly in the global
//! environment rather than inside a type module.
//!
//! These are the fallback tier of dispatch — environment and control
//! operations that make sense for any left-operand type, plus the two
//! stack specials `reset` and `shift`.

use std::{rc::Rc, thread, time::Duration};

use num_traits::ToPrimitive;

use crate::{
    env::Env,
    error::{ExcKind, RunError, RunResult},
    eval::{self, Interp, bool_num, is_cons_tree, select_branch, truthy},
    intern::Interner,
    parse::parse,
    registry::{bind_builtin, bind_special},
    types::num::Number,
    value::{Function, Payload, Value},
};

/// Binds the ambient operation set into `env`.
pub(crate) fn install_ambient(interner: &mut Interner, env: &Env) {
    bind_special(env, interner, "reset", eval::special_reset);
    bind_special(env, interner, "shift", eval::special_shift);

    bind_builtin(env, interner, "$", lookup_op);
    bind_builtin(env, interner, ":=", assign_op);
    bind_builtin(env, interner, "as", bind_as);
    bind_builtin(env, interner, "to", assign_to);
    bind_builtin(env, interner, "is", bind_is);
    bind_builtin(env, interner, "dispatch", set_dispatch);

    bind_builtin(env, interner, "if", if_op);
    bind_builtin(env, interner, "then", then_op);
    bind_builtin(env, interner, "?", then_op);
    bind_builtin(env, interner, "not", not_op);
    bind_builtin(env, interner, "and", and_op);
    bind_builtin(env, interner, "or", or_op);

    bind_builtin(env, interner, "t", type_of);
    bind_builtin(env, interner, "sametype", sametype);
    bind_builtin(env, interner, "=", equals);
    bind_builtin(env, interner, "%", typecheck);
    bind_builtin(env, interner, "!%", typecheck_not);

    bind_builtin(env, interner, "func", func_op);
    bind_builtin(env, interner, "bake", bake_op);
    bind_builtin(env, interner, "open", open_op);
    bind_builtin(env, interner, "unwrap", open_op);
    bind_builtin(env, interner, "!", invoke);

    bind_builtin(env, interner, "L", crate::types::tree::left_child);
    bind_builtin(env, interner, "H", crate::types::tree::head_child);
    bind_builtin(env, interner, "R", crate::types::tree::right_child);

    bind_builtin(env, interner, ",", app);
    bind_builtin(env, interner, "vec", empty_vec);
    bind_builtin(env, interner, "obj", new_object);
    bind_builtin(env, interner, ";", seq);
    bind_builtin(env, interner, "|", seq);

    bind_builtin(env, interner, "print", print_op);
    bind_builtin(env, interner, "wait", wait_op);
    bind_builtin(env, interner, "load", load_op);
    bind_builtin(env, interner, "import", import_op);
    bind_builtin(env, interner, "jsoneach", jsoneach);
}

/// `L $ name`: environment lookup with the left operand as fallback.
fn lookup_op(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let Some(name) = b.name(interp.interner) else {
        return Err(RunError::type_error("$ expects a symbol or string name").with_span(b.span()));
    };
    Ok(env.lookup(name).unwrap_or_else(|| a.clone()))
}

fn assignment_target(interp: &mut Interp, value: &Value) -> RunResult<crate::intern::NameId> {
    value
        .name(interp.interner)
        .ok_or_else(|| RunError::type_error("assignment target must be a symbol").with_span(value.span()))
}

/// `name := value`: assign through the chain, creating locally when new.
fn assign_op(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let name = assignment_target(interp, a)?;
    env.assign(name, b.clone());
    Ok(b.clone())
}

/// `value as name`: bind in the local frame.
fn bind_as(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let name = assignment_target(interp, b)?;
    env.bind(name, a.clone());
    Ok(a.clone())
}

/// `value to name`: assign through the chain.
fn assign_to(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let name = assignment_target(interp, b)?;
    env.assign(name, a.clone());
    Ok(a.clone())
}

/// `name is value`: bind in the local frame.
fn bind_is(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let name = assignment_target(interp, a)?;
    env.bind(name, b.clone());
    Ok(b.clone())
}

/// `op dispatch (witness : name)`: register `op` in the type module of the
/// witness value, creating the module when the type has none yet.
fn set_dispatch(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let Some(pair) = b.as_tree().filter(|t| is_cons_tree(t)) else {
        return Err(RunError::type_error("dispatch expects a `witness : name` cons pair").with_span(b.span()));
    };
    let Some(op_name) = pair.right.name(interp.interner) else {
        return Err(RunError::type_error("dispatch name must be a symbol or string").with_span(pair.right.span()));
    };
    let label = pair.left.tag().name_id();
    match env.lookup(label).as_ref().and_then(Value::payload) {
        Some(Payload::Object(module)) => module.bind(op_name, a.clone()),
        _ => {
            let module = Env::root();
            module.bind(op_name, a.clone());
            env.bind(label, Value::object(module));
        }
    }
    Ok(a.clone())
}

/// `(then : else) if cond`.
fn if_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    select_branch(a, b)
}

/// `cond then (then : else)` / `cond ? (then : else)`.
fn then_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    select_branch(b, a)
}

fn not_op(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(!truthy(a)?))
}

fn and_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(truthy(a)? && truthy(b)?))
}

fn or_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(truthy(a)? || truthy(b)?))
}

/// `v t ()`: the type label of the left operand, as a symbol.
fn type_of(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::symbol(a.tag().name_id()))
}

fn sametype(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(a.tag() == b.tag()))
}

fn equals(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(bool_num(a.deep_eq(b)))
}

/// `v % "NUM"`: pass `v` through when its type label matches, else raise a
/// type error (catchable via `reset "error"`).
fn typecheck(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let Some(expected) = b.name(interp.interner) else {
        return Err(RunError::type_error("% expects a type label").with_span(b.span()));
    };
    if a.tag().name_id() == expected {
        Ok(a.clone())
    } else {
        let got = interp.interner.resolve(a.tag().name_id()).to_owned();
        let want = interp.interner.resolve(expected).to_owned();
        Err(RunError::type_error(format!("expected {want}, got {got}")).with_span(a.span()))
    }
}

/// `v !% "NUM"`: the negated typecheck.
fn typecheck_not(interp: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let Some(rejected) = b.name(interp.interner) else {
        return Err(RunError::type_error("!% expects a type label").with_span(b.span()));
    };
    if a.tag().name_id() == rejected {
        let label = interp.interner.resolve(rejected).to_owned();
        Err(RunError::type_error(format!("did not expect a {label}")).with_span(a.span()))
    } else {
        Ok(a.clone())
    }
}

/// `[body] func ()`: thunk to function promotion.
fn func_op(_: &mut Interp, a: &Value, _: &Value, env: &Env) -> RunResult<Value> {
    eval::make_function(a, env)
}

/// `f bake ()`: strips thunk wrappers out of a function's body, so the
/// previously-delayed subtrees evaluate when the body runs.
fn bake_op(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let Some(Payload::Function(function)) = a.payload() else {
        return Err(RunError::type_error("bake expects a FUNCTION operand").with_span(a.span()));
    };
    let baked = Function {
        left_name: function.left_name,
        right_name: function.right_name,
        body: strip_thunks(&function.body),
        env: function.env.clone(),
    };
    Ok(Value::leaf(Payload::Function(Rc::new(baked)), a.span()))
}

/// Unwraps one layer of `THUNK` at every leaf position, recursing through
/// trees.
fn strip_thunks(body: &Value) -> Value {
    match body {
        Value::Tree(tree) => Value::tree(
            strip_thunks(&tree.left),
            strip_thunks(&tree.head),
            strip_thunks(&tree.right),
            tree.span,
        ),
        Value::Leaf(leaf) => match &leaf.payload {
            Payload::Thunk(inner) => inner.clone(),
            _ => body.clone(),
        },
    }
}

fn open_op(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    a.unwrap_wrapped()
        .ok_or_else(|| RunError::type_error("open expects a wrapped value").with_span(a.span()))
}

/// `x ! f`: apply the right operand to the left, as `Tree(x, f, ())`.
fn invoke(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::tree(a.clone(), b.clone(), Value::unit(), a.span()))
}

/// `a , b`: append to a vec, or start one from two values.
fn app(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    match a.payload() {
        Some(Payload::Vec(items)) => {
            let mut items = (**items).clone();
            items.push(b.clone());
            Ok(Value::vec(items))
        }
        _ => Ok(Value::vec(vec![a.clone(), b.clone()])),
    }
}

fn empty_vec(_: &mut Interp, _: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::vec(Vec::new()))
}

/// `() obj ()`: a fresh mutable object whose environment chains to the
/// caller's, so its slots can see ambient bindings.
fn new_object(_: &mut Interp, _: &Value, _: &Value, env: &Env) -> RunResult<Value> {
    Ok(Value::object(Env::child(env)))
}

fn seq(_: &mut Interp, _: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    Ok(b.clone())
}

fn print_op(interp: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let rendered = a.render(interp.interner);
    interp.writer.stdout_write(rendered.into())?;
    interp.writer.stdout_push('\n')?;
    Ok(a.clone())
}

/// `v wait n`: block the evaluator for `n` seconds, then return `v`.
fn wait_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let n = b.expect_num("wait")?;
    let seconds = match n {
        Number::Int(secs) => secs
            .to_u64()
            .ok_or_else(|| RunError::value_error("wait expects a non-negative finite duration").with_span(b.span()))?,
        _ => return Err(RunError::value_error("wait expects a non-negative finite duration").with_span(b.span())),
    };
    thread::sleep(Duration::from_secs(seconds));
    Ok(a.clone())
}

fn read_source_file(path: &Value) -> RunResult<String> {
    let path_text = path.expect_str("load")?;
    std::fs::read_to_string(path_text)
        .map_err(|err| RunError::new(ExcKind::IoError, format!("can't read {path_text}: {err}")).with_span(path.span()))
}

fn run_file(interp: &mut Interp, path: &Value, env: &Env) -> RunResult<Value> {
    let source = read_source_file(path)?;
    let tree = parse(&source, interp.interner)?;
    let result = eval::execute(interp, tree, env)?;
    if let Some(Payload::Error(e)) = result.payload() {
        return Err(RunError::new(e.kind, e.message.clone()));
    }
    Ok(result)
}

/// `"path" load ()`: evaluate a file in a fresh child environment and
/// return that environment as an `OBJECT`.
fn load_op(interp: &mut Interp, a: &Value, _: &Value, env: &Env) -> RunResult<Value> {
    let child = Env::child(env);
    run_file(interp, a, &child)?;
    Ok(Value::object(child))
}

/// `"path" import ()`: evaluate a file in the current environment for its
/// side effects; yields the file's final value.
fn import_op(interp: &mut Interp, a: &Value, _: &Value, env: &Env) -> RunResult<Value> {
    run_file(interp, a, env)
}

/// `"path" jsoneach fn`: parse each line of the file as a JSON object and
/// invoke `fn` on it wrapped as a `NATIVE_OBJECT`. Yields the line count.
fn jsoneach(interp: &mut Interp, a: &Value, b: &Value, env: &Env) -> RunResult<Value> {
    let source = read_source_file(a)?;
    let mut count: i64 = 0;
    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: serde_json::Value = serde_json::from_str(line)
            .map_err(|err| RunError::new(ExcKind::JsonError, format!("line {}: {err}", count + 1)))?;
        let serde_json::Value::Object(map) = parsed else {
            return Err(RunError::new(
                ExcKind::JsonError,
                format!("line {}: expected a JSON object", count + 1),
            ));
        };
        let native = Value::leaf(Payload::Native(Rc::new(map)), a.span());
        eval::apply(interp, native, b.clone(), Value::unit(), env)?;
        count += 1;
    }
    Ok(Value::num_i64(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{io::NoPrint, resource::ResourceLimits, tracer::NoopTracer, value::Tag};

    fn with_interp<T>(f: impl FnOnce(&mut Interp, &Env) -> T) -> T {
        let mut interner = Interner::new();
        let mut writer = NoPrint;
        let mut tracer = NoopTracer;
        let mut interp = Interp {
            interner: &mut interner,
            writer: &mut writer,
            tracer: &mut tracer,
            limits: ResourceLimits::none(),
        };
        let env = Env::root();
        f(&mut interp, &env)
    }

    #[test]
    fn app_builds_and_extends_vecs() {
        with_interp(|interp, env| {
            let pair = app(interp, &Value::num_i64(1), &Value::num_i64(2), env).unwrap();
            assert_eq!(pair.tag(), Tag::VEC);
            let extended = app(interp, &pair, &Value::num_i64(3), env).unwrap();
            let Some(Payload::Vec(items)) = extended.payload() else {
                panic!("expected a vec");
            };
            assert_eq!(items.len(), 3);
        });
    }

    #[test]
    fn typecheck_passes_and_rejects_by_label() {
        with_interp(|interp, env| {
            let label = Value::string("NUM");
            let ok = typecheck(interp, &Value::num_i64(1), &label, env).unwrap();
            assert!(ok.deep_eq(&Value::num_i64(1)));
            let err = typecheck(interp, &Value::string("x"), &label, env).unwrap_err();
            assert_eq!(err.kind(), ExcKind::TypeError);
        });
    }

    #[test]
    fn dispatch_registers_into_a_fresh_module() {
        with_interp(|interp, env| {
            let op = Value::num_i64(9);
            let name = Value::string("shout");
            let pair = Value::tree(
                Value::string("witness"),
                Value::punctuation(crate::intern::StaticNames::Colon.id()),
                name,
                None,
            );
            set_dispatch(interp, &op, &pair, env).unwrap();
            let module = env.lookup(crate::intern::StaticNames::String.id()).unwrap();
            assert_eq!(module.tag(), Tag::OBJECT);
        });
    }
}
