use crate::commands::traits::{Command, CommandArgs};
use crate::error::FatalError;
use crate::result::{ExecResult, Outcome};
use crate::session::Shell;

/// Remove a user variable: `unset $NAME` or `unset ${NAME}`.
///
/// The sigil is required, exactly as the name is written in
/// expressions. Builtin variables cannot be removed.
pub struct Unset;

/// Strip the `$`/`${}` sigil, rejecting anything that isn't a
/// well-formed reference.
fn strip_sigil(arg: &str) -> Option<&str> {
    let rest = arg.strip_prefix('$')?;
    let name = match rest.strip_prefix('{') {
        Some(braced) => braced.strip_suffix('}')?,
        None => rest,
    };
    (!name.is_empty()).then_some(name)
}

impl Command for Unset {
    fn name(&self) -> &str {
        "unset"
    }

    fn usage(&self) -> &str {
        "Usage: unset $NAME"
    }

    fn execute(&self, args: CommandArgs, shell: &mut Shell) -> Result<Outcome, FatalError> {
        let [arg] = args.positional.as_slice() else {
            return Ok(Outcome::of(ExecResult::failure(1, self.usage())));
        };
        let Some(name) = strip_sigil(arg) else {
            return Ok(Outcome::of(ExecResult::failure(
                1,
                format!("`{arg}` is not a variable reference ({})", self.usage()),
            )));
        };
        let result = match shell.unset_var(name) {
            Ok(()) => ExecResult::success(),
            Err(e) => ExecResult::failure(1, e.to_string()),
        };
        Ok(Outcome::of(result))
    }
}

#[cfg(test)]
mod tests {
    use super::strip_sigil;
    use crate::session::{Shell, ShellConfig};
    use crate::value::Value;
    use rstest::rstest;

    #[rstest]
    #[case("$x", Some("x"))]
    #[case("${x}", Some("x"))]
    #[case("${long_name}", Some("long_name"))]
    #[case("x", None)]
    #[case("${x", None)]
    #[case("$", None)]
    #[case("${}", None)]
    fn sigil_stripping(#[case] arg: &str, #[case] expected: Option<&str>) {
        assert_eq!(strip_sigil(arg), expected);
    }

    #[test]
    fn unset_removes_a_user_variable() {
        let mut sh = Shell::with_builtins(ShellConfig::default()).unwrap();
        sh.run_line("set x=5").unwrap();
        assert!(sh.run_line("unset $x").unwrap().result.ok());
        let outcome = sh.run_line("echo $x").unwrap();
        assert!(outcome.result.out.is_empty());
        assert!(outcome.result.err.contains("does not exist"));
    }

    #[test]
    fn unset_builtin_is_refused() {
        let mut sh = Shell::with_builtins(ShellConfig::default()).unwrap();
        sh.define_builtin_var("home", Value::Str("/".into()));
        let outcome = sh.run_line("unset $home").unwrap();
        assert_eq!(outcome.result.code, 1);
        assert!(outcome.result.err.contains("builtin"));
    }

    #[test]
    fn unset_missing_is_recoverable() {
        let mut sh = Shell::with_builtins(ShellConfig::default()).unwrap();
        let outcome = sh.run_line("unset $ghost").unwrap();
        assert_eq!(outcome.result.code, 1);
    }

    #[test]
    fn unset_without_sigil_is_refused() {
        let mut sh = Shell::with_builtins(ShellConfig::default()).unwrap();
        sh.run_line("set x=5").unwrap();
        let outcome = sh.run_line("unset x").unwrap();
        assert_eq!(outcome.result.code, 1);
        assert!(sh.vars().contains("x"));
    }
}
