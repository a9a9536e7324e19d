use crate::commands::traits::{Command, CommandArgs};
use crate::error::FatalError;
use crate::eval::evaluate;
use crate::parser::parse;
use crate::result::{ExecResult, Outcome};
use crate::session::Shell;

/// Assign a variable: `set NAME=EXPR`.
///
/// The tail splits on the single `=`; zero or multiple `=` is a
/// malformed assignment. The right side is a full expression, so
/// `set x=$x+1` works.
pub struct Set;

impl Command for Set {
    fn name(&self) -> &str {
        "set"
    }

    fn usage(&self) -> &str {
        "Usage: set NAME=EXPR"
    }

    fn split_args(&self) -> bool {
        false
    }

    fn execute(&self, args: CommandArgs, shell: &mut Shell) -> Result<Outcome, FatalError> {
        let mut parts = args.raw.splitn(3, '=');
        let (name, expr) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(expr), None) => (name.trim(), expr.trim()),
            _ => {
                return Ok(Outcome::of(ExecResult::failure(
                    1,
                    format!("malformed assignment `{}` ({})", args.raw, self.usage()),
                )));
            }
        };
        if name.is_empty() || expr.is_empty() || name.contains(char::is_whitespace) {
            return Ok(Outcome::of(ExecResult::failure(
                1,
                format!("malformed assignment `{}` ({})", args.raw, self.usage()),
            )));
        }
        let result = match parse(expr).and_then(|ast| evaluate(&ast, shell.vars())) {
            Ok(value) => {
                shell.set_var(name, value);
                ExecResult::success()
            }
            Err(e) => ExecResult::failure(1, e.to_string()),
        };
        Ok(Outcome::of(result))
    }
}

#[cfg(test)]
mod tests {
    use crate::session::{Shell, ShellConfig};
    use crate::value::Value;
    use rstest::rstest;

    fn shell() -> Shell {
        Shell::with_builtins(ShellConfig::default()).unwrap()
    }

    #[test]
    fn set_then_echo_round_trip() {
        let mut sh = shell();
        assert!(sh.run_line("set x=5").unwrap().result.ok());
        let outcome = sh.run_line("echo $x").unwrap();
        assert_eq!(outcome.result.out, "5");
    }

    #[test]
    fn set_evaluates_the_right_side() {
        let mut sh = shell();
        sh.run_line("set x=2").unwrap();
        sh.run_line("set x=$x*10").unwrap();
        assert_eq!(sh.vars().get("x"), Some(&Value::Int(20)));
    }

    #[test]
    fn set_updates_builtin_instead_of_shadowing() {
        let mut sh = shell();
        sh.define_builtin_var("home", Value::Str("/".into()));
        sh.run_line("set home=\"/tmp\"").unwrap();
        assert!(sh.vars().is_builtin("home"));
        assert_eq!(sh.vars().get("home"), Some(&Value::Str("/tmp".into())));
        assert!(sh.vars().user_names().is_empty());
    }

    #[rstest]
    #[case("set x")]
    #[case("set =5")]
    #[case("set x=")]
    #[case("set a=b=c")]
    #[case("set my var=1")]
    fn malformed_assignments_are_recoverable(#[case] line: &str) {
        let mut sh = shell();
        let outcome = sh.run_line(line).unwrap();
        assert_eq!(outcome.result.code, 1);
        assert!(outcome.result.err.contains("malformed assignment"));
    }

    #[test]
    fn bad_expression_reports_without_storing() {
        let mut sh = shell();
        let outcome = sh.run_line("set x=$nope").unwrap();
        assert_eq!(outcome.result.code, 1);
        assert!(sh.vars().get("x").is_none());
    }
}
