use crate::commands::traits::{Command, CommandArgs};
use crate::error::FatalError;
use crate::eval::evaluate;
use crate::parser::parse;
use crate::result::{ExecResult, Outcome};
use crate::session::Shell;

/// Evaluate an expression and print the result.
///
/// The whole argument tail is one expression, so `echo 1 + 2` prints
/// `3` and `echo "x is $x"` interpolates.
pub struct Echo;

impl Command for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn usage(&self) -> &str {
        "Usage: echo EXPR"
    }

    fn split_args(&self) -> bool {
        false
    }

    fn execute(&self, args: CommandArgs, shell: &mut Shell) -> Result<Outcome, FatalError> {
        if args.raw.is_empty() {
            return Ok(Outcome::of(ExecResult::failure(1, self.usage())));
        }
        let result = match parse(&args.raw).and_then(|ast| evaluate(&ast, shell.vars())) {
            Ok(value) => ExecResult::with_out(value.to_string()),
            // Nothing is printed when the expression fails.
            Err(e) => ExecResult::failure(1, e.to_string()),
        };
        Ok(Outcome::of(result))
    }
}
