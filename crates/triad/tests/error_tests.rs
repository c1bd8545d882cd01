//! Error handling: reification of native failures, `reset "error"`
//! interception, structural reducer errors, diagnostics, and resource
//! limits.

use triad::{ExcKind, NoPrint, Object, ReplError, ReplSession, ResourceLimits};

fn eval(source: &str) -> Object {
    ReplSession::new()
        .execute(source, &mut NoPrint)
        .unwrap_or_else(|err| panic!("{source:?} failed: {err}"))
}

fn eval_err(source: &str) -> ReplError {
    ReplSession::new()
        .execute(source, &mut NoPrint)
        .expect_err("expected an error")
}

/// A native failure inside `reset "error"` arrives as an ERROR value.
#[test]
fn reset_error_catches_division_by_zero() {
    let result = eval("\"error\" reset [ 1 / 0 ]");
    match result {
        Object::Error { kind, message } => {
            assert_eq!(kind, "ZeroDivision");
            assert!(
                message.contains("division by zero"),
                "message should mention the division: {message}"
            );
        }
        other => panic!("expected an error value, got {other}"),
    }
}

/// Every execution installs a default `"error"` delimiter, so an uncaught
/// native failure still reduces to an ERROR value instead of aborting.
#[test]
fn uncaught_native_failure_reifies_at_the_root() {
    let result = eval("1 / 0");
    assert!(matches!(result, Object::Error { .. }), "got {result}");
}

/// The printed form of an uncaught failure names the problem.
#[test]
fn error_values_render_their_message() {
    let rendered = ReplSession::new().execute_rendered("1 / 0", &mut NoPrint).unwrap();
    assert_eq!(rendered, "error: integer division by zero");
}

/// A failure raised deep inside a function call still reaches the handler.
#[test]
fn errors_propagate_out_of_function_calls() {
    let result = eval("\"error\" reset [ 41 {x | x / 0} () ]");
    assert!(matches!(result, Object::Error { .. }), "got {result}");
}

/// Work after the failing statement is skipped: the shift unwinds to the
/// handler.
#[test]
fn errors_abort_the_delimited_body() {
    let result = eval("\"error\" reset [ (1 / 0) + 1000 ]");
    assert!(matches!(result, Object::Error { .. }), "got {result}");
}

/// An operator with no resolution anywhere is a NoDispatch failure with a
/// source excerpt in the diagnostic.
#[test]
fn no_dispatch_terminates_with_diagnostic() {
    match eval_err("\"a\" + 1") {
        ReplError::Runtime { error, diagnostic } => {
            assert_eq!(error.kind(), ExcKind::NoDispatch);
            assert!(diagnostic.contains('^'), "diagnostic should carry a caret: {diagnostic}");
        }
        ReplError::Parse { .. } => panic!("expected a runtime error"),
    }
}

/// A head with no reduction rule is a CantReduce failure.
#[test]
fn non_operator_head_cant_reduce() {
    match eval_err("1 2 3") {
        ReplError::Runtime { error, .. } => assert_eq!(error.kind(), ExcKind::CantReduce),
        ReplError::Parse { .. } => panic!("expected a runtime error"),
    }
}

/// Unbalanced parens are a parse error carrying the offending span.
#[test]
fn parse_errors_are_distinguished() {
    match eval_err("(1 + 2") {
        ReplError::Parse { error, .. } => assert_eq!(error.kind(), ExcKind::Parse),
        ReplError::Runtime { .. } => panic!("expected a parse error"),
    }
    assert!(matches!(eval_err("1 + 2)"), ReplError::Parse { .. }));
}

/// `%` passes matching values through and reifies on mismatch; `!%` is
/// the negation.
#[test]
fn typecheck_operators() {
    assert_eq!(eval("5 % \"NUM\""), Object::int(5));
    assert_eq!(eval("5 !% \"STRING\""), Object::int(5));
    assert!(matches!(eval("5 % \"STRING\""), Object::Error { .. }));
    assert!(matches!(eval("5 !% \"NUM\""), Object::Error { .. }));
}

/// Typecheck failures are catchable like any reified error.
#[test]
fn typecheck_failures_are_catchable() {
    let result = eval("\"error\" reset [ 5 % \"STRING\" ]");
    match result {
        Object::Error { kind, .. } => assert_eq!(kind, "TypeError"),
        other => panic!("expected an error value, got {other}"),
    }
}

/// The step limit aborts a long reduction with a Resource error.
#[test]
fn step_limit_aborts() {
    let mut session = ReplSession::new().with_limits(ResourceLimits::none().with_max_steps(10));
    let err = session
        .execute("1 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1", &mut NoPrint)
        .expect_err("step limit should trip");
    match err {
        ReplError::Runtime { error, .. } => assert_eq!(error.kind(), ExcKind::Resource),
        ReplError::Parse { .. } => panic!("expected a runtime error"),
    }
}

/// The depth limit bounds the cactus stack.
#[test]
fn depth_limit_aborts() {
    let mut session = ReplSession::new().with_limits(ResourceLimits::none().with_max_depth(3));
    let err = session
        .execute("((((((((1 + 1) + 1) + 1) + 1) + 1) + 1) + 1) + 1)", &mut NoPrint)
        .expect_err("depth limit should trip");
    match err {
        ReplError::Runtime { error, .. } => assert_eq!(error.kind(), ExcKind::Resource),
        ReplError::Parse { .. } => panic!("expected a runtime error"),
    }
}

/// Unlimited sessions run the same program fine.
#[test]
fn no_limits_by_default() {
    assert_eq!(eval("((((((((1 + 1) + 1) + 1) + 1) + 1) + 1) + 1) + 1)"), Object::int(9));
}
