//! shellkit REPL — interactive frontend for the shellkit kernel.
//!
//! It handles:
//! - Line editing and history via rustyline
//! - Completion and syntax highlighting fed by kernel registry
//!   notifications (see [`helper`])
//! - The dotted continuation prompt while a control block is open
//! - Printing command output and recoverable errors

pub mod helper;

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing::warn;

use shellkit_kernel::{FatalError, Flow, Outcome, Shell, ShellConfig};

use crate::helper::ShellHelper;

/// REPL state: one session plus display policy.
pub struct Repl {
    shell: Shell,
}

impl Repl {
    pub fn new(config: ShellConfig) -> Result<Self, FatalError> {
        Ok(Self {
            shell: Shell::with_builtins(config)?,
        })
    }

    pub fn shell(&mut self) -> &mut Shell {
        &mut self.shell
    }

    /// Feed one line through the session and print what it produced.
    /// Returns the exit code once the session asked to stop.
    pub fn process_line(&mut self, line: &str) -> Result<Option<i32>, FatalError> {
        let outcome = self.shell.run_line(line)?;
        print_outcome(&outcome);
        match outcome.flow {
            Flow::Exit(code) => Ok(Some(code)),
            Flow::Continue => Ok(None),
        }
    }
}

fn print_outcome(outcome: &Outcome) {
    if !outcome.result.out.is_empty() {
        println!("{}", outcome.result.out);
    }
    if !outcome.result.err.is_empty() {
        eprintln!("{}", outcome.result.err);
    }
}

fn save_history(rl: &mut Editor<ShellHelper, DefaultHistory>, path: &Option<PathBuf>) {
    if let Some(path) = path {
        if let Err(e) = rl.save_history(path) {
            warn!("failed to save history: {e}");
        }
    }
}

/// Run the interactive loop until `exit` or end-of-input.
pub fn run(config: ShellConfig) -> Result<i32> {
    println!("shellkit v{}", env!("CARGO_PKG_VERSION"));
    println!("Type `help` for commands, `exit` to leave.");

    let history_path = config.history_path.clone();
    let mut rl: Editor<ShellHelper, DefaultHistory> =
        Editor::with_config(Config::builder().auto_add_history(true).build())
            .context("failed to create editor")?;

    let (helper, observer) = ShellHelper::new();
    rl.set_helper(Some(helper));

    if let Some(ref path) = history_path {
        if let Err(e) = rl.load_history(path) {
            let missing = matches!(&e, ReadlineError::Io(io) if io.kind() == std::io::ErrorKind::NotFound);
            if !missing {
                warn!("failed to load history: {e}");
            }
        }
    }

    let mut repl = Repl::new(config).unwrap_or_else(|fatal| fatal.exit());
    repl.shell().add_observer(observer);
    println!();

    loop {
        let prompt = repl.shell.prompt().to_string();
        match rl.readline(&prompt) {
            Ok(line) => match repl.process_line(&line) {
                Ok(None) => {}
                Ok(Some(code)) => {
                    save_history(&mut rl, &history_path);
                    return Ok(code);
                }
                Err(fatal) => {
                    save_history(&mut rl, &history_path);
                    fatal.exit();
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellkit_kernel::Value;

    #[test]
    fn process_line_reports_exit() {
        let mut repl = Repl::new(ShellConfig::default()).unwrap();
        assert_eq!(repl.process_line("set x=1").unwrap(), None);
        assert_eq!(repl.process_line("exit").unwrap(), Some(0));
    }

    #[test]
    fn session_state_persists_across_lines() {
        let mut repl = Repl::new(ShellConfig::default()).unwrap();
        repl.process_line("set greeting=\"hi\"").unwrap();
        assert_eq!(
            repl.shell().vars().get("greeting"),
            Some(&Value::Str("hi".into()))
        );
    }
}
