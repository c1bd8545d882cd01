//! REPL session behavior: state persistence across snippets, print
//! capture, tracing, and the file operations `load` / `import` /
//! `jsoneach`.

use std::{fs, path::PathBuf};

use pretty_assertions::assert_eq;
use triad::{CollectStringPrint, NoPrint, Object, RecordingTracer, ReplSession, TraceEvent};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("triad_{}_{name}", std::process::id()));
    fs::write(&path, contents).expect("temp file should be writable");
    path
}

// =============================================================================
// Session state
// =============================================================================

/// Bindings persist across execute() calls.
#[test]
fn variables_persist_across_lines() {
    let mut session = ReplSession::new();
    session.execute("a := 10", &mut NoPrint).unwrap();
    session.execute("b := 20", &mut NoPrint).unwrap();
    assert_eq!(session.execute(".$a + .$b", &mut NoPrint).unwrap(), Object::int(30));
}

/// A function defined in one line can be applied in a later one.
#[test]
fn functions_persist_across_lines() {
    let mut session = ReplSession::new();
    session.execute("double := {x | x * 2}", &mut NoPrint).unwrap();
    assert_eq!(session.execute("21 (.$double) ()", &mut NoPrint).unwrap(), Object::int(42));
}

/// Shadowing a builtin in one session does not leak into a fresh one.
#[test]
fn sessions_are_isolated() {
    let mut dirty = ReplSession::new();
    dirty.execute("{(x:y) | 0} as print", &mut NoPrint).unwrap();
    let mut fresh = ReplSession::new();
    let mut out = CollectStringPrint::new();
    fresh.execute("1 print ()", &mut out).unwrap();
    assert_eq!(out.output(), "1\n");
}

// =============================================================================
// Printing
// =============================================================================

/// `print` writes the rendered value plus a newline and passes the value
/// through.
#[test]
fn print_captures_rendered_values() {
    let mut session = ReplSession::new();
    let mut out = CollectStringPrint::new();
    let result = session.execute("(1 , 2) print ()", &mut out).unwrap();
    assert_eq!(out.output(), "[1, 2]\n");
    assert_eq!(result, Object::Vec(vec![Object::int(1), Object::int(2)]));
}

/// Strings print quoted, symbols bare.
#[test]
fn print_forms() {
    let mut session = ReplSession::new();
    let mut out = CollectStringPrint::new();
    session.execute("\"hi\" print ()", &mut out).unwrap();
    session.execute("(5 t ()) print ()", &mut out).unwrap();
    assert_eq!(out.output(), "\"hi\"\nNUM\n");
}

// =============================================================================
// Tracing
// =============================================================================

/// The recording tracer observes dispatches and function application.
#[test]
fn recording_tracer_sees_dispatch() {
    let mut session = ReplSession::new();
    let mut tracer = RecordingTracer::new();
    session.execute_traced("1 + 2", &mut NoPrint, &mut tracer).unwrap();
    assert!(
        tracer.events().contains(&TraceEvent::Dispatch {
            op: "+".to_owned(),
            left_type: "NUM".to_owned(),
        }),
        "events: {:?}",
        tracer.events()
    );
}

/// Tail calls show up as flattened applications.
#[test]
fn recording_tracer_sees_tail_flattening() {
    let mut session = ReplSession::new();
    let mut tracer = RecordingTracer::new();
    session
        .execute_traced(
            "(count := {n | n = 0 ? ([0] : [(n - 1) F ()])}) | 3 (.$count) ()",
            &mut NoPrint,
            &mut tracer,
        )
        .unwrap();
    assert!(
        tracer
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::Apply { flattened: true, .. })),
        "expected a flattened apply: {:?}",
        tracer.events()
    );
}

// =============================================================================
// File operations
// =============================================================================

/// `load` evaluates a file in a child environment and returns it as an
/// object whose slots and functions are accessible.
#[test]
fn load_returns_a_module_object() {
    let path = temp_file("load.tri", "(base := 10) | (inc := {n | n + 1})");
    let mut session = ReplSession::new();
    let source = format!("(m := (\"{}\" load ())) | (.$m) @ base", path.display());
    assert_eq!(session.execute(&source, &mut NoPrint).unwrap(), Object::int(10));
    let call = "5 ((.$m) . inc) ()";
    assert_eq!(session.execute(call, &mut NoPrint).unwrap(), Object::int(6));
    fs::remove_file(path).ok();
}

/// `load` keeps the loaded bindings out of the caller's environment.
#[test]
fn load_does_not_pollute_the_caller() {
    let path = temp_file("load_clean.tri", "secret := 1");
    let mut session = ReplSession::new();
    let source = format!("(\"{}\" load ()) | 7 $ secret", path.display());
    // `$` falls back to its left operand, so an unbound name yields 7.
    assert_eq!(session.execute(&source, &mut NoPrint).unwrap(), Object::int(7));
    fs::remove_file(path).ok();
}

/// `import` evaluates in the current environment.
#[test]
fn import_binds_into_the_caller() {
    let path = temp_file("import.tri", "z := 99");
    let mut session = ReplSession::new();
    let source = format!("(\"{}\" import ()) | .$z", path.display());
    assert_eq!(session.execute(&source, &mut NoPrint).unwrap(), Object::int(99));
    fs::remove_file(path).ok();
}

/// An unreadable path is an IO failure, reified like any native error.
#[test]
fn load_of_missing_file_reifies() {
    let mut session = ReplSession::new();
    let result = session
        .execute("\"/definitely/not/here.tri\" load ()", &mut NoPrint)
        .unwrap();
    assert!(matches!(result, Object::Error { .. }), "got {result}");
}

/// `jsoneach` parses one JSON object per line and applies the function to
/// each, returning the line count.
#[test]
fn jsoneach_streams_objects() {
    let path = temp_file("each.jsonl", "{\"a\": 1}\n{\"a\": 2}\n{\"a\": 3}\n");
    let mut session = ReplSession::new();
    let mut out = CollectStringPrint::new();
    let source = format!("\"{}\" jsoneach {{o | (o @ a) print ()}}", path.display());
    let count = session.execute(&source, &mut out).unwrap();
    assert_eq!(count, Object::int(3));
    assert_eq!(out.output(), "1\n2\n3\n");
    fs::remove_file(path).ok();
}

/// Non-object JSON lines are rejected with a catchable error.
#[test]
fn jsoneach_rejects_non_objects() {
    let path = temp_file("bad.jsonl", "[1, 2]\n");
    let mut session = ReplSession::new();
    let source = format!("\"{}\" jsoneach {{o | o}}", path.display());
    let result = session.execute(&source, &mut NoPrint).unwrap();
    assert!(matches!(result, Object::Error { .. }), "got {result}");
    fs::remove_file(path).ok();
}
