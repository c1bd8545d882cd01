//! Output abstraction for the `print` builtin.
//!
//! Implement [`PrintWriter`] to capture or redirect print output from
//! embedded code. The default implementation [`StdPrint`] writes to stdout.

use std::{
    borrow::Cow,
    io::{self, Write as _},
};

use crate::error::RunResult;

/// Trait for handling output from the `print` builtin.
pub trait PrintWriter {
    /// Called with the rendered form of the printed value, without a
    /// trailing newline.
    fn stdout_write(&mut self, output: Cow<'_, str>) -> RunResult<()>;

    /// Adds a single character to the output, generally the newline after a
    /// printed value.
    fn stdout_push(&mut self, end: char) -> RunResult<()>;
}

/// Default `PrintWriter` that writes to stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> RunResult<()> {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(output.as_bytes());
        let _ = stdout.flush();
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> RunResult<()> {
        let mut buf = [0u8; 4];
        let mut stdout = io::stdout();
        let _ = stdout.write_all(end.encode_utf8(&mut buf).as_bytes());
        let _ = stdout.flush();
        Ok(())
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Returns the collected output as a string slice.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> RunResult<()> {
        self.0.push_str(&output);
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> RunResult<()> {
        self.0.push(end);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) -> RunResult<()> {
        Ok(())
    }

    fn stdout_push(&mut self, _end: char) -> RunResult<()> {
        Ok(())
    }
}
