//! The standard command set every session starts from.

mod echo;
mod exit;
mod help;
mod set;
mod source;
mod unset;

pub use echo::Echo;
pub use exit::Exit;
pub use help::Help;
pub use set::Set;
pub use source::Source;
pub use unset::Unset;

use std::sync::Arc;

use crate::error::FatalError;
use crate::session::Shell;

/// Register the builtin commands on a session. Fails only if the host
/// already registered a clashing name, which is a host bug.
pub fn register_builtins(shell: &mut Shell) -> Result<(), FatalError> {
    shell.register(Arc::new(Exit))?;
    shell.register(Arc::new(Help))?;
    shell.register(Arc::new(Echo))?;
    shell.register(Arc::new(Set))?;
    shell.register(Arc::new(Unset))?;
    shell.register(Arc::new(Source))?;
    Ok(())
}
