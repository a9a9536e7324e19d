//! Error types for shellkit.
//!
//! Errors come in two tiers. Recoverable errors (`ExprError`,
//! `VarError`) are reported to the user and the session keeps going.
//! `FatalError` marks internal-consistency failures — bugs in command
//! registration or the engine, never user input — and carries a
//! reserved process exit code so each failure kind stays
//! distinguishable in diagnostics.

use thiserror::Error;

/// Errors from parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// The text does not match the expression grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A `$name` resolved through neither the builtin nor the user
    /// namespace.
    #[error("variable {0} does not exist")]
    UndefinedVariable(String),

    /// A `${name` reference with no closing brace.
    #[error("unbalanced variable reference: missing '}}' after '${{{0}'")]
    Unbalanced(String),

    /// An operator applied to operands it has no rule for.
    #[error("type error: cannot apply '{op}' to {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Integer arithmetic wrapped.
    #[error("integer overflow in '{0}'")]
    Overflow(&'static str),
}

/// Errors from the variable store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VarError {
    /// Builtin variables can be updated but never deleted.
    #[error("cannot unset builtin variable {0}")]
    ReadOnly(String),

    /// The name exists in neither namespace.
    #[error("variable {0} does not exist")]
    NotFound(String),
}

/// Internal-consistency failures.
///
/// Each variant maps to a distinct small-integer exit code. The codes
/// are diagnostic, not a stable public contract, but must stay distinct
/// per failure kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FatalError {
    /// A command's usage text has no `Usage:` section.
    #[error("usage text for command '{0}' is malformed")]
    MalformedUsage(String),

    /// Two commands registered under the same name.
    #[error("a command named '{0}' already exists")]
    DuplicateCommand(String),

    /// Registration with an empty name.
    #[error("command name must not be empty")]
    EmptyCommandName,

    /// A close keyword that does not match the open block's kind
    /// reached resolution (e.g. `endwhile` closing an `if`).
    #[error("'{found}' cannot close an open '{open}' block")]
    MismatchedBlockClose {
        open: &'static str,
        found: &'static str,
    },

    /// A loop block reached resolution with other than one guarded arm.
    #[error("while block resolved with {0} condition/body pairs")]
    LoopArmShape(usize),
}

impl FatalError {
    /// The reserved process exit code for this failure kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            FatalError::MalformedUsage(_) => 3,
            FatalError::DuplicateCommand(_) => 7,
            FatalError::EmptyCommandName => 8,
            FatalError::MismatchedBlockClose { .. } => 9,
            FatalError::LoopArmShape(_) => 10,
        }
    }

    /// Log the failure and terminate the process with its reserved code.
    pub fn exit(&self) -> ! {
        tracing::error!("fatal: {self}");
        std::process::exit(self.exit_code() as i32)
    }
}
