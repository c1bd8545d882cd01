//! The reducer: an iterative tree-rewriting loop over the ternary IR.
//!
//! State is `(x, ins, env, cstack)`: the current value, the
//! sub-instruction pointer, the environment, and the cactus stack. The loop
//! never recurses into the tree; descending into a child pushes a
//! structural frame and popping one re-enters the suspended triple. This is
//! what makes `shift` able to capture "the rest of the computation" as
//! plain data.
//!
//! Head reduction order matters and mirrors the language rules: separators
//! tail-continue before the right operand is evaluated, cons heads (`.` and
//! `:`) never reduce, and everything dispatchable goes through the
//! type-directed lookup in [`dispatch`].

use std::rc::Rc;

use crate::{
    cactus::{Cactus, Frame},
    env::Env,
    error::{ExcKind, RunError, RunResult},
    intern::{Interner, NameId, StaticNames},
    io::PrintWriter,
    lex::Span,
    resource::ResourceLimits,
    tracer::EvalTracer,
    types::num::Number,
    value::{Continuation, ErrorPayload, Function, Ins, Payload, Tag, TreeNode, Value},
};

/// Mutable interpreter context threaded through natives and the loop.
///
/// Holds everything a native operation may need besides the environment:
/// the interner (names are created during dispatch and by `load`), the
/// print writer, the tracer, and the resource limits.
pub(crate) struct Interp<'a> {
    pub interner: &'a mut Interner,
    pub writer: &'a mut dyn PrintWriter,
    pub tracer: &'a mut dyn EvalTracer,
    pub limits: ResourceLimits,
}

/// Reduces `x` under a fresh cactus stack with the standard delimiters.
///
/// The stack is seeded with the root delimiter and an `"error"` delimiter,
/// which is what makes any reified native failure land as an `ERROR` value
/// at the top level when user code does not intercept it earlier.
pub(crate) fn execute(interp: &mut Interp, x: Value, env: &Env) -> RunResult<Value> {
    let mut cstack = Cactus::new(StaticNames::RootTag.id());
    cstack.push(Frame::return_frame(env.clone()));
    cstack.spush(StaticNames::ErrorTag.id());
    run(interp, x, env.clone(), &mut cstack)
}

/// Applies `op` to `(left, right)` via a nested execution.
///
/// Used by natives that need to call back into the language (fold, each,
/// `jsoneach`, object constructors used from native code). An `ERROR`
/// result converts back into the `RunError` it reified from, so failures
/// propagate to the caller's own `reset "error"` handler.
pub(crate) fn apply(interp: &mut Interp, left: Value, op: Value, right: Value, env: &Env) -> RunResult<Value> {
    let tree = Value::tree(left, op, right, None);
    let result = execute(interp, tree, env)?;
    if let Some(Payload::Error(e)) = result.payload() {
        return Err(RunError::new(e.kind, e.message.clone()));
    }
    Ok(result)
}

/// The main reduction loop.
fn run(interp: &mut Interp, x: Value, env: Env, cstack: &mut Cactus) -> RunResult<Value> {
    let mut x = x;
    let mut env = env;
    let mut ins = x.ins();
    let mut left = Value::unit();
    let mut head = Value::unit();
    let mut right = Value::unit();
    let mut steps: u64 = 0;

    'run: loop {
        steps += 1;
        interp.limits.check(steps, cstack.depth())?;

        'reduce: {
            if ins < Ins::Tree {
                break 'reduce;
            }
            if ins == Ins::Tree {
                let tree = x.as_tree().expect("ins is Tree only for tree-shaped values");
                left = tree.left.clone();
                head = tree.head.clone();
                right = tree.right.clone();
            }
            if ins < Ins::Left && left.is_tree() {
                cstack.push(Frame::new(Ins::Left, left.clone(), head.clone(), right.clone(), env.clone()));
                x = left.clone();
                ins = x.ins();
                continue 'run;
            }
            if ins < Ins::Head && head.is_tree() {
                cstack.push(Frame::new(Ins::Head, left.clone(), head.clone(), right.clone(), env.clone()));
                x = head.clone();
                ins = x.ins();
                continue 'run;
            }
            if head.tag() == Tag::SEPARATOR {
                // Tail-continue into R before it is evaluated: `a | b` is
                // "evaluate a, discard, become b".
                x = right.clone();
                ins = x.ins();
                continue 'run;
            }
            if ins < Ins::Right && right.is_tree() {
                cstack.push(Frame::new(Ins::Right, left.clone(), head.clone(), right.clone(), env.clone()));
                x = right.clone();
                ins = x.ins();
                continue 'run;
            }

            let span = head.span().or_else(|| x.span());
            match head.payload() {
                Some(Payload::Unit) => {
                    x = head.clone();
                    break 'reduce;
                }
                Some(Payload::Continuation(cc)) => {
                    interp.tracer.on_resume(interp.interner.resolve(cc.segment.tag));
                    env = cc.env.clone();
                    cstack.scopy(&cc.segment);
                    x = left.clone();
                    ins = x.ins();
                    continue 'run;
                }
                Some(Payload::Punctuation(id))
                    if *id == StaticNames::Dot.id() || *id == StaticNames::Colon.id() =>
                {
                    // Cons heads never reduce: the triple is the value.
                    x = Value::tree(left.clone(), head.clone(), right.clone(), span);
                    break 'reduce;
                }
                Some(Payload::Builtin(builtin)) => {
                    match (builtin.f)(interp, &left, &right, &env) {
                        Ok(value) => {
                            x = value;
                            ins = x.ins();
                            continue 'run;
                        }
                        Err(err) if err.kind().is_reifiable() => {
                            x = reify(err, span);
                            ins = Ins::Tree;
                            continue 'run;
                        }
                        Err(err) => return Err(err.with_span(span)),
                    }
                }
                Some(Payload::Special(special)) => {
                    match (special.f)(interp, &left, &right, &mut env, cstack) {
                        Ok(value) => {
                            x = value;
                            ins = x.ins();
                            continue 'run;
                        }
                        Err(err) if err.kind().is_reifiable() => {
                            x = reify(err, span);
                            ins = Ins::Tree;
                            continue 'run;
                        }
                        Err(err) => return Err(err.with_span(span)),
                    }
                }
                Some(Payload::Funthunk(_)) => {
                    // Delayed promotion: `L {body} R` becomes
                    // `L ({body} func ()) R`.
                    let promote = Value::tree(
                        head.clone(),
                        Value::leaf(Payload::Symbol(StaticNames::Func.id()), span),
                        Value::unit(),
                        span,
                    );
                    x = Value::tree(left.clone(), promote, right.clone(), span);
                    ins = Ins::Tree;
                    continue 'run;
                }
                Some(Payload::Thunk(body)) => {
                    x = body.clone();
                    ins = x.ins();
                    continue 'run;
                }
                Some(Payload::Function(function)) => {
                    let flattened = cstack.peek().is_some_and(|top| {
                        top.kind == Ins::Function
                            && matches!(
                                top.head.payload(),
                                Some(Payload::Function(previous)) if Rc::ptr_eq(previous, function)
                            )
                    });
                    if !flattened {
                        cstack.push(Frame::new(
                            Ins::Function,
                            left.clone(),
                            head.clone(),
                            right.clone(),
                            env.clone(),
                        ));
                        env = Env::child(&function.env);
                    }
                    interp.tracer.on_apply(flattened, cstack.depth());
                    env.bind(function.left_name, left.clone());
                    env.bind(StaticNames::SelfFunction.id(), head.clone());
                    env.bind(function.right_name, right.clone());
                    x = function.body.clone();
                    ins = x.ins();
                    continue 'run;
                }
                Some(Payload::Object(object)) => {
                    let Some(constructor) = object.lookup(StaticNames::Dot.id()) else {
                        return Err(RunError::new(ExcKind::CantReduce, "object has no constructor slot").with_span(span));
                    };
                    x = Value::tree(left.clone(), constructor, right.clone(), span);
                    ins = Ins::Tree;
                    continue 'run;
                }
                Some(Payload::Symbol(id) | Payload::Punctuation(id) | Payload::Separator(id)) => {
                    let op = dispatch(interp, &env, &left, *id, &right, span)?;
                    x = Value::tree(left.clone(), op, right.clone(), span);
                    ins = Ins::Tree;
                    continue 'run;
                }
                Some(Payload::Str(text)) => {
                    let op_name = interp.interner.intern(text);
                    let op = dispatch(interp, &env, &left, op_name, &right, span)?;
                    x = Value::tree(left.clone(), op, right.clone(), span);
                    ins = Ins::Tree;
                    continue 'run;
                }
                None => {
                    // Head is a tree. A cons-headed tree is a module path
                    // like `m.sqrt`; anything else has no reduction rule.
                    let tree = head.as_tree().expect("leaf payloads are handled above");
                    if is_cons_tree(tree) {
                        let op = resolve_module_path(interp, &env, tree, span)?;
                        x = Value::tree(left.clone(), op, right.clone(), span);
                        ins = Ins::Tree;
                        continue 'run;
                    }
                    return Err(RunError::new(ExcKind::CantReduce, "head tree is not a module path").with_span(span));
                }
                Some(_) => {
                    let label = interp.interner.resolve(head.tag().name_id()).to_owned();
                    return Err(
                        RunError::new(ExcKind::CantReduce, format!("can't reduce head of type {label}"))
                            .with_span(span),
                    );
                }
            }
        }

        // Apply the next continuation frame.
        let Some(frame) = cstack.pop() else {
            return Ok(x);
        };
        ins = frame.kind;
        if ins == Ins::Return {
            return Ok(x);
        }
        left = frame.left;
        head = frame.head;
        right = frame.right;
        env = frame.env;
        match ins {
            Ins::Function => ins = x.ins(),
            Ins::Left => left = x.clone(),
            Ins::Head => head = x.clone(),
            Ins::Right => right = x.clone(),
            _ => unreachable!("only continuation frame kinds are pushed"),
        }
    }
}

/// Whether a tree node has a cons head (`.` or `:`).
pub(crate) fn is_cons_tree(tree: &TreeNode) -> bool {
    matches!(
        tree.head.payload(),
        Some(Payload::Punctuation(id)) if *id == StaticNames::Dot.id() || *id == StaticNames::Colon.id()
    )
}

/// Rewrites a reifiable native failure into `error shift (ERROR msg)`.
///
/// The resulting tree dispatches `shift` with tag `error`, so the failure
/// travels to the nearest `reset "error"` delimiter as an `ERROR` value.
fn reify(err: RunError, span: Option<Span>) -> Value {
    let tag = Value::leaf(Payload::Symbol(StaticNames::ErrorTag.id()), span);
    let shift = Value::leaf(Payload::Symbol(StaticNames::Shift.id()), span);
    let payload = Value::leaf(
        Payload::Error(Rc::new(ErrorPayload {
            kind: err.kind(),
            message: err.message().to_owned(),
        })),
        err.span().or(span),
    );
    Value::tree(tag, shift, payload, span)
}

/// Type-directed operator dispatch.
///
/// Resolution order: the left operand type's module tried with `op:rt`,
/// then with `op`, then the ambient environment with `op`. The resolved
/// value must be function-like.
pub(crate) fn dispatch(
    interp: &mut Interp,
    env: &Env,
    left: &Value,
    op_name: NameId,
    right: &Value,
    span: Option<Span>,
) -> RunResult<Value> {
    let left_tag = left.tag();
    interp.tracer.on_dispatch(
        interp.interner.resolve(op_name),
        interp.interner.resolve(left_tag.name_id()),
    );

    let mut resolved = None;
    if let Some(module) = env.lookup(left_tag.name_id())
        && let Some(Payload::Object(module_env)) = module.payload()
    {
        let key = interp.interner.dispatch_key(op_name, right.tag().name_id());
        resolved = module_env.lookup(key).or_else(|| module_env.lookup(op_name));
    }
    let resolved = resolved.or_else(|| env.lookup(op_name));

    match resolved {
        Some(op) if op.is_function_like() => Ok(op),
        Some(_) => {
            let name = interp.interner.resolve(op_name).to_owned();
            Err(RunError::type_error(format!("{name} resolved to a value that is not callable")).with_span(span))
        }
        None => {
            let name = interp.interner.resolve(op_name).to_owned();
            let label = interp.interner.resolve(left_tag.name_id()).to_owned();
            Err(RunError::new(
                ExcKind::NoDispatch,
                format!("can't dispatch {name} on L: {label}"),
            )
            .with_span(span))
        }
    }
}

/// Resolves a module-path head like `a.b.c op` to the operation bound as
/// `op` inside the object the path names.
fn resolve_module_path(interp: &mut Interp, env: &Env, tree: &TreeNode, span: Option<Span>) -> RunResult<Value> {
    let object = resolve_path_object(interp, env, &tree.left, span)?;
    let Some(name) = tree.right.name(interp.interner) else {
        return Err(RunError::type_error("module path component must be a symbol").with_span(span));
    };
    object.lookup(name).ok_or_else(|| {
        let text = interp.interner.resolve(name).to_owned();
        RunError::new(ExcKind::NoDispatch, format!("module has no member {text}")).with_span(span)
    })
}

fn resolve_path_object(interp: &mut Interp, env: &Env, value: &Value, span: Option<Span>) -> RunResult<Env> {
    let object = match value.payload() {
        Some(Payload::Object(object)) => Some(object.clone()),
        Some(Payload::Symbol(id)) => match env.lookup(*id) {
            Some(bound) => match bound.payload() {
                Some(Payload::Object(object)) => Some(object.clone()),
                _ => None,
            },
            None => None,
        },
        None => {
            let tree = value.as_tree().expect("payload is None only for trees");
            if is_cons_tree(tree) {
                let parent = resolve_path_object(interp, env, &tree.left, span)?;
                let Some(name) = tree.right.name(interp.interner) else {
                    return Err(RunError::type_error("module path component must be a symbol").with_span(span));
                };
                match parent.lookup(name).as_ref().and_then(Value::payload) {
                    Some(Payload::Object(object)) => Some(object.clone()),
                    _ => None,
                }
            } else {
                None
            }
        }
        _ => None,
    };
    object.ok_or_else(|| RunError::new(ExcKind::NoDispatch, "module path does not name an object").with_span(span))
}

/// `reset`: install a delimiter labelled by the tag in `L` and reduce `R`
/// (unwrapped when it is a thunk) inside it.
pub(crate) fn special_reset(
    interp: &mut Interp,
    left: &Value,
    right: &Value,
    _env: &mut Env,
    cstack: &mut Cactus,
) -> RunResult<Value> {
    let Some(tag) = left.name(interp.interner) else {
        return Err(RunError::type_error("reset expects a tag symbol or string").with_span(left.span()));
    };
    cstack.spush(tag);
    Ok(match right.payload() {
        Some(Payload::Thunk(body)) => body.clone(),
        _ => right.clone(),
    })
}

/// `shift`: capture the stack up to the nearest delimiter with the tag in
/// `L`, bind the continuation, and run the handler in `R`.
///
/// The captured continuation is bound under the tag name in a fresh child
/// environment; a thunk handler runs in that environment, a function-like
/// handler is called with the continuation as its left argument, and any
/// other handler value is returned directly at the delimiter.
pub(crate) fn special_shift(
    interp: &mut Interp,
    left: &Value,
    right: &Value,
    env: &mut Env,
    cstack: &mut Cactus,
) -> RunResult<Value> {
    let Some(tag) = left.name(interp.interner) else {
        return Err(RunError::type_error("shift expects a tag symbol or string").with_span(left.span()));
    };
    let Some(segment) = cstack.spop(tag) else {
        let text = interp.interner.resolve(tag).to_owned();
        return Err(
            RunError::new(ExcKind::UnmatchedShift, format!("no reset \"{text}\" delimiter in the stack"))
                .with_span(left.span()),
        );
    };
    interp.tracer.on_capture(interp.interner.resolve(tag), segment.len());

    let handler_env = Env::child(env);
    let continuation = Value::leaf(
        Payload::Continuation(Rc::new(Continuation {
            segment,
            env: handler_env.clone(),
        })),
        left.span(),
    );
    handler_env.bind(tag, continuation.clone());
    *env = handler_env;

    Ok(match right.payload() {
        Some(Payload::Thunk(body)) => body.clone(),
        _ if right.is_function_like() => Value::tree(continuation, right.clone(), Value::unit(), right.span()),
        _ => right.clone(),
    })
}

/// Builds a `FUNCTION` from a thunk or funthunk: strips the parameter
/// header, bakes parameter reads, and captures the environment.
pub(crate) fn make_function(wrapped: &Value, env: &Env) -> RunResult<Value> {
    let body = match wrapped.payload() {
        Some(Payload::Thunk(body) | Payload::Funthunk(body)) => body.clone(),
        Some(Payload::Function(_)) => return Ok(wrapped.clone()),
        _ => {
            return Err(
                RunError::type_error("func expects a thunk or funthunk operand").with_span(wrapped.span()),
            );
        }
    };
    let (left_name, right_name, body) = strip_header(body);
    let names = [left_name, right_name];
    let body = bake(&body, names);
    Ok(Value::leaf(
        Payload::Function(Rc::new(Function {
            left_name,
            right_name,
            body,
            env: env.clone(),
        })),
        wrapped.span(),
    ))
}

/// Splits off a `header | rest` parameter header when present.
///
/// `{x | body}` names the left parameter; `{x:y | body}` names both. Any
/// other shape keeps the whole body and the default names `x` and `y`.
fn strip_header(body: Value) -> (NameId, NameId, Value) {
    if let Some(tree) = body.as_tree()
        && tree.head.tag() == Tag::SEPARATOR
    {
        if let Some(Payload::Symbol(name)) = tree.left.payload() {
            return (*name, StaticNames::Underscore.id(), tree.right.clone());
        }
        if let Some(header) = tree.left.as_tree()
            && is_cons_tree(header)
            && let (Some(Payload::Symbol(a)), Some(Payload::Symbol(b))) =
                (header.left.payload(), header.right.payload())
        {
            return (*a, *b, tree.right.clone());
        }
    }
    (StaticNames::X.id(), StaticNames::Y.id(), body)
}

/// Rewrites every free occurrence of a parameter name into an explicit
/// `. $ name` lookup tree, recursing through trees and thunk bodies.
/// Funthunk bodies are left alone; they bake against their own parameters
/// at their own promotion.
fn bake(body: &Value, names: [NameId; 2]) -> Value {
    match body {
        Value::Tree(tree) => Value::tree(
            bake(&tree.left, names),
            bake(&tree.head, names),
            bake(&tree.right, names),
            tree.span,
        ),
        Value::Leaf(leaf) => match &leaf.payload {
            Payload::Symbol(id) if names.contains(id) => {
                let dot = Value::leaf(Payload::Symbol(StaticNames::Dot.id()), leaf.span);
                let dollar = Value::leaf(Payload::Punctuation(StaticNames::Dollar.id()), leaf.span);
                Value::tree(dot, dollar, body.clone(), leaf.span)
            }
            Payload::Thunk(inner) => Value::leaf(Payload::Thunk(bake(inner, names)), leaf.span),
            _ => body.clone(),
        },
    }
}

/// Applies `Number` truthiness to a conditional pair: `L` when the
/// condition is non-zero, `R` when zero, unwrapping thunk branches.
pub(crate) fn select_branch(pair: &Value, condition: &Value) -> RunResult<Value> {
    let Some(tree) = pair.as_tree().filter(|t| is_cons_tree(t)) else {
        return Err(RunError::type_error("if expects a `then : else` cons pair").with_span(pair.span()));
    };
    let n = condition.expect_num("if")?;
    let branch = if n.is_truthy() { &tree.left } else { &tree.right };
    Ok(branch.unwrap_wrapped().unwrap_or_else(|| branch.clone()))
}

/// Applies an operation given either by name or as a function-like value.
///
/// Folds, scans, and friends take their operation as `"+"` (resolved per
/// element pair through normal dispatch) or as an actual function value
/// (applied directly via a nested execution).
pub(crate) fn apply_operation(
    interp: &mut Interp,
    env: &Env,
    left: Value,
    op: &Value,
    right: Value,
) -> RunResult<Value> {
    let by_name = match op.payload() {
        Some(Payload::Symbol(id) | Payload::Punctuation(id)) => Some(*id),
        Some(Payload::Str(text)) => Some(interp.interner.intern(text)),
        _ => None,
    };
    if let Some(name) = by_name {
        let resolved = dispatch(interp, env, &left, name, &right, op.span())?;
        return apply(interp, left, resolved, right, env);
    }
    if op.is_function_like() {
        return apply(interp, left, op.clone(), right, env);
    }
    Err(RunError::type_error("expected an operation name or a function").with_span(op.span()))
}

/// Numeric truthiness helper shared by the logical builtins.
pub(crate) fn truthy(value: &Value) -> RunResult<bool> {
    Ok(value.expect_num("logical operator")?.is_truthy())
}

/// Builds the NUM leaf for a boolean result.
pub(crate) fn bool_num(b: bool) -> Value {
    Value::num(Number::from_i64(i64::from(b)))
}
