//! Command execution results.

use std::fmt;

/// What a command produced: an exit code plus captured output streams.
///
/// Commands write into `out`/`err` rather than printing directly, so
/// the host decides where the text goes and tests can assert on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub code: i32,
    pub out: String,
    pub err: String,
}

impl ExecResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failure(code: i32, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
        }
    }

    pub fn with_out(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// Fold another result into this one: outputs append (newline
    /// separated), the latest nonzero code wins.
    pub fn accumulate(&mut self, other: ExecResult) {
        if !other.out.is_empty() {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            self.out.push_str(&other.out);
        }
        if !other.err.is_empty() {
            if !self.err.is_empty() {
                self.err.push('\n');
            }
            self.err.push_str(&other.err);
        }
        if other.code != 0 {
            self.code = other.code;
        }
    }
}

impl fmt::Display for ExecResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit {}", self.code)?;
        if !self.err.is_empty() {
            write!(f, ": {}", self.err)?;
        }
        Ok(())
    }
}

/// Whether the session keeps reading lines after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Stop the session with this exit code (`exit` command).
    Exit(i32),
}

/// A command's result paired with its effect on the session loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub flow: Flow,
    pub result: ExecResult,
}

impl Outcome {
    pub fn of(result: ExecResult) -> Self {
        Self {
            flow: Flow::Continue,
            result,
        }
    }

    pub fn exit(code: i32) -> Self {
        Self {
            flow: Flow::Exit(code),
            result: ExecResult {
                code,
                ..ExecResult::default()
            },
        }
    }
}
