use crate::commands::traits::{Command, CommandArgs};
use crate::error::FatalError;
use crate::result::Outcome;
use crate::session::Shell;

/// Leave the session cleanly.
pub struct Exit;

impl Command for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn usage(&self) -> &str {
        "Usage: exit"
    }

    fn execute(&self, _args: CommandArgs, _shell: &mut Shell) -> Result<Outcome, FatalError> {
        Ok(Outcome::exit(0))
    }
}

#[cfg(test)]
mod tests {
    use crate::result::Flow;
    use crate::session::{Shell, ShellConfig};

    #[test]
    fn exit_signals_the_loop() {
        let mut shell = Shell::with_builtins(ShellConfig::default()).unwrap();
        let outcome = shell.run_line("exit").unwrap();
        assert_eq!(outcome.flow, Flow::Exit(0));
    }
}
