use std::{
    fs,
    io::{self, Read, Write},
    process::ExitCode,
};

use triad::{Object, ReplSession, Runner, StdPrint};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None => repl(),
        Some("run") => {
            if args.len() > 3 {
                usage();
                return ExitCode::FAILURE;
            }
            batch(args.get(2).map(String::as_str))
        }
        Some(_) => {
            usage();
            ExitCode::FAILURE
        }
    }
}

fn usage() {
    eprintln!("usage: triad [run [FILE]]");
}

/// Batch mode: evaluate one whole program and print its final value.
///
/// Reducer errors print a diagnostic but still exit successfully; only a
/// usage problem (including an unreadable FILE) is a failure.
fn batch(path: Option<&str>) -> ExitCode {
    let source = match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error reading {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut source = String::new();
            if let Err(err) = io::stdin().read_to_string(&mut source) {
                eprintln!("error reading stdin: {err}");
                return ExitCode::FAILURE;
            }
            source
        }
    };

    match Runner::new(source).run(&mut StdPrint) {
        Ok(value) => println!("{value}"),
        Err(err) => eprintln!("{err}"),
    }
    ExitCode::SUCCESS
}

/// Interactive mode: read, evaluate, print, loop.
fn repl() -> ExitCode {
    let mut session = ReplSession::new();
    let mut source = String::new();

    loop {
        let prompt = if source.is_empty() { "> " } else { ". " };
        let Some(line) = read_line(prompt) else {
            println!();
            break;
        };

        if source.is_empty() && line.trim().is_empty() {
            continue;
        }

        if !source.is_empty() {
            source.push('\n');
        }
        source.push_str(&line);

        if needs_more_input(&source) {
            continue;
        }

        match session.execute(&source, &mut StdPrint) {
            Ok(Object::Unit) => {}
            Ok(value) => println!("{value}"),
            Err(err) => eprintln!("{err}"),
        }
        source.clear();
    }

    ExitCode::SUCCESS
}

/// Heuristic multiline detector: keep reading while brackets are open.
fn needs_more_input(source: &str) -> bool {
    let mut balance = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for ch in source.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' | '[' | '{' => balance += 1,
            ')' | ']' | '}' => balance -= 1,
            _ => {}
        }
    }
    balance > 0 || in_string
}

/// Reads one line from stdin after printing a prompt.
///
/// Returns `None` on EOF (Ctrl+D).
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    if io::stdout().flush().is_err() {
        return None;
    }
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input).ok()?;
    if read == 0 {
        return None;
    }
    Some(input.trim_end_matches(['\r', '\n']).to_owned())
}
