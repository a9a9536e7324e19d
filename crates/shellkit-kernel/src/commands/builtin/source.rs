use std::path::Path;

use crate::commands::traits::{Command, CommandArgs, CompletionHint};
use crate::error::FatalError;
use crate::result::{ExecResult, Outcome};
use crate::session::Shell;

/// Run a script file through the current session.
///
/// Each line goes through the ordinary intake path; variables set by
/// the script persist, and an `exit` in the script exits the session.
pub struct Source;

impl Command for Source {
    fn name(&self) -> &str {
        "source"
    }

    fn usage(&self) -> &str {
        "Usage: source FILE"
    }

    fn split_args(&self) -> bool {
        false
    }

    fn completion_hint(&self) -> CompletionHint {
        CompletionHint::FileExt(".shell".into())
    }

    fn execute(&self, args: CommandArgs, shell: &mut Shell) -> Result<Outcome, FatalError> {
        if args.raw.is_empty() {
            return Ok(Outcome::of(ExecResult::failure(1, self.usage())));
        }
        shell.run_script(Path::new(&args.raw))
    }
}
