#![doc = include_str!("../../../README.md")]

mod builtins;
mod cactus;
mod env;
mod error;
mod eval;
mod intern;
mod io;
mod lex;
mod object;
mod parse;
mod registry;
mod repl;
mod repl_error;
mod resource;
mod run;
mod tracer;
mod types;
mod value;

pub use crate::{
    error::{ExcKind, RunError},
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    lex::Span,
    object::Object,
    repl::ReplSession,
    repl_error::ReplError,
    resource::ResourceLimits,
    run::Runner,
    tracer::{EvalTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
};
