//! Delimited continuation tests: `reset` / `shift` capture, resumption,
//! multi-shot invocation, and the unmatched-shift failure mode.

use pretty_assertions::assert_eq;
use triad::{ExcKind, NoPrint, Object, ReplError, ReplSession};

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

/// The round trip: capturing and immediately resuming delivers the value.
#[test]
fn reset_shift_round_trip() {
    assert_eq!(eval("\"t\" reset [ \"t\" shift [ 42 (.$t) () ] ]"), Object::int(42));
}

/// Two invocations of the captured `10 + _` continuation compose as
/// `(10 + 1) + (10 + 2)`.
#[test]
fn continuations_are_multi_shot() {
    let source = "\"k\" reset [ 10 + (\"k\" shift [ (1 (.$k) ()) + (2 (.$k) ()) ]) ]";
    assert_eq!(eval(source), Object::int(23));
}

/// A handler that never resumes aborts the delimited computation.
#[test]
fn shift_without_resume_aborts() {
    assert_eq!(eval("\"k\" reset [ 1 + (\"k\" shift [ 99 ]) ]"), Object::int(99));
}

/// A non-callable handler value is delivered directly at the delimiter.
#[test]
fn shift_with_plain_value_returns_it() {
    assert_eq!(eval("\"k\" reset [ 1 + (\"k\" shift 7) ]"), Object::int(7));
}

/// A delimiter is transparent for a normal return.
#[test]
fn reset_is_transparent_on_normal_return() {
    assert_eq!(eval("\"k\" reset [ 5 ]"), Object::int(5));
    assert_eq!(eval("(\"k\" reset [ 5 ]) + 1"), Object::int(6));
}

/// `shift` unwinds past delimiters with other tags to find its own.
#[test]
fn shift_skips_foreign_delimiters() {
    let source = "\"outer\" reset [ 1 + (\"inner\" reset [ \"outer\" shift [ 50 ] ]) ]";
    assert_eq!(eval(source), Object::int(50));
}

/// Nested same-tag delimiters: the innermost one catches.
#[test]
fn innermost_delimiter_wins() {
    let source = "\"k\" reset [ 100 + (\"k\" reset [ \"k\" shift [ 1 ] ]) ]";
    assert_eq!(eval(source), Object::int(101));
}

/// A captured continuation survives being stored and resumed later in the
/// same expression chain.
#[test]
fn continuation_as_a_stored_value() {
    let source = "(cc := (\"k\" reset [ 3 + (\"k\" shift [ .$k ]) ])) | 4 (.$cc) ()";
    assert_eq!(eval(source), Object::int(7));
}

/// A shift with no matching reset is fatal and names the tag.
#[test]
fn unmatched_shift_is_fatal() {
    let err = eval_err("\"nope\" shift [ 1 ]");
    match err {
        ReplError::Runtime { error, diagnostic } => {
            assert_eq!(error.kind(), ExcKind::UnmatchedShift);
            assert!(diagnostic.contains("nope"), "diagnostic should name the tag: {diagnostic}");
        }
        ReplError::Parse { .. } => panic!("expected a runtime error"),
    }
}

/// The session survives an unmatched shift: the next execution starts
/// from a fresh stack with its delimiters restored.
#[test]
fn session_recovers_after_unmatched_shift() {
    let mut session = ReplSession::new();
    assert!(session.execute("\"nope\" shift [ 1 ]", &mut NoPrint).is_err());
    assert_eq!(session.execute("1 + 2", &mut NoPrint).unwrap(), Object::int(3));
}
