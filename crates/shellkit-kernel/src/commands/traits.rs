//! The `Command` trait and its argument plumbing.

use crate::error::FatalError;
use crate::result::Outcome;
use crate::session::Shell;

/// Arguments handed to a command for one invocation.
///
/// `raw` is the line with the command name stripped and surrounding
/// whitespace trimmed. For commands that declare `split_args`,
/// `positional` holds the whitespace-split words; otherwise it is
/// empty and the command works from `raw`.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub positional: Vec<String>,
    pub raw: String,
}

impl CommandArgs {
    pub fn parse(rest: &str, split: bool) -> Self {
        let raw = rest.trim().to_string();
        let positional = if split {
            raw.split_whitespace().map(str::to_string).collect()
        } else {
            Vec::new()
        };
        Self { positional, raw }
    }
}

/// What an interactive frontend should offer when completing a
/// command's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CompletionHint {
    /// No argument completion.
    #[default]
    None,
    /// Complete from a fixed word list.
    Words(Vec<String>),
    /// Complete file paths with this extension.
    FileExt(String),
}

/// A named operation the shell can dispatch to.
///
/// Commands are registered once at startup and looked up by name for
/// every line. They report output through `ExecResult` instead of
/// printing, and touch session state only through the `Shell` handle.
pub trait Command: Send + Sync {
    /// The dispatch name, as typed at the prompt.
    fn name(&self) -> &str;

    /// Usage text. The first line must start with `Usage:`; the
    /// registry rejects anything else at registration time.
    fn usage(&self) -> &str;

    /// Whether the argument tail is split into whitespace words before
    /// dispatch. Commands that treat the tail as a single expression
    /// (like `if` or `set`) turn this off.
    fn split_args(&self) -> bool {
        true
    }

    fn completion_hint(&self) -> CompletionHint {
        CompletionHint::None
    }

    /// Run the command. User mistakes come back as a failing
    /// `ExecResult`; the `Err` side is reserved for fatal
    /// internal-consistency failures, which only `source` can surface
    /// by re-entering the session.
    fn execute(&self, args: CommandArgs, shell: &mut Shell) -> Result<Outcome, FatalError>;
}

/// Callback interface for watching the command table and variable
/// store change. Frontends use this to keep completion tables in sync.
pub trait RegistryObserver: Send + Sync {
    fn command_added(&self, name: &str, hint: &CompletionHint);

    fn variable_added(&self, _name: &str) {}

    fn variable_removed(&self, _name: &str) {}
}
