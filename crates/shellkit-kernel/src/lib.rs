//! shellkit-kernel: the interpreter core of shellkit.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes expression text using logos
//! - **Parser**: Builds a flattened n-ary AST with conventional precedence
//! - **Evaluator**: Reduces an AST against the variable store, with
//!   string interpolation and short-circuit `and`/`or`
//! - **Variable store**: Builtin and user namespaces, builtin shadows user
//! - **Session**: Control-block capture and replay for `if`/`elif`/`else`
//!   and `while`, plus line dispatch
//! - **Commands**: The `Command` trait, the registry, and the builtin set

pub mod ast;
pub mod commands;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod result;
pub mod session;
pub mod value;
pub mod vars;

pub use commands::{Command, CommandArgs, CompletionHint, Registry, RegistryObserver};
pub use error::{ExprError, FatalError, VarError};
pub use result::{ExecResult, Flow, Outcome};
pub use session::{Shell, ShellConfig};
pub use value::Value;
pub use vars::VarStore;

// Highlighting conveniences (embedders drive their own display)
pub use lexer::{scan_for_highlight, TokenCategory};

// Expression engine entry points (usable without a session)
pub use eval::evaluate;
pub use parser::parse;
