use std::fmt::Write as _;

use crate::commands::traits::{Command, CommandArgs, CompletionHint};
use crate::error::FatalError;
use crate::result::{ExecResult, Outcome};
use crate::session::Shell;

/// List registered commands and/or variables.
pub struct Help;

impl Command for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn usage(&self) -> &str {
        "Usage: help [-c | --commands] [-v | --variables]"
    }

    fn completion_hint(&self) -> CompletionHint {
        CompletionHint::Words(vec!["--commands".into(), "--variables".into()])
    }

    fn execute(&self, args: CommandArgs, shell: &mut Shell) -> Result<Outcome, FatalError> {
        let mut commands = false;
        let mut variables = false;
        for arg in &args.positional {
            match arg.as_str() {
                "-c" | "--commands" => commands = true,
                "-v" | "--variables" => variables = true,
                other => {
                    return Ok(Outcome::of(ExecResult::failure(
                        1,
                        format!("unknown option `{other}` ({})", self.usage()),
                    )));
                }
            }
        }
        // Bare `help` lists commands.
        if !commands && !variables {
            commands = true;
        }
        let mut out = String::new();
        if commands {
            out.push_str("commands:");
            for name in shell.registry().names() {
                let _ = write!(out, "\n  {name}");
            }
        }
        if variables {
            if commands {
                out.push('\n');
            }
            out.push_str("variables:");
            for name in shell.vars().builtin_names() {
                let _ = write!(out, "\n  {name} (builtin)");
            }
            for name in shell.vars().user_names() {
                let _ = write!(out, "\n  {name}");
            }
        }
        Ok(Outcome::of(ExecResult::with_out(out)))
    }
}
