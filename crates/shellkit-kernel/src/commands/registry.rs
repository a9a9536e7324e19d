//! Command registration and lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::commands::traits::Command;
use crate::error::FatalError;

/// The dispatch table: command name to implementation.
///
/// Registration happens once at startup and is strict: an empty name,
/// a duplicate name, or usage text that doesn't start with `Usage:`
/// is a fatal configuration error, not something to limp past.
#[derive(Default)]
pub struct Registry {
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<(), FatalError> {
        let name = command.name().to_string();
        if name.is_empty() {
            return Err(FatalError::EmptyCommandName);
        }
        if self.commands.contains_key(&name) {
            return Err(FatalError::DuplicateCommand(name));
        }
        if !command.usage().trim_start().starts_with("Usage:") {
            return Err(FatalError::MalformedUsage(name));
        }
        debug!(command = %name, "registered");
        self.commands.insert(name, command);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    /// Registered commands in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Command>)> {
        self.commands.iter().map(|(name, cmd)| (name.as_str(), cmd))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn usage_of(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(|c| c.usage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::traits::CommandArgs;
    use crate::result::{ExecResult, Outcome};
    use crate::session::Shell;

    struct Fake {
        name: &'static str,
        usage: &'static str,
    }

    impl Command for Fake {
        fn name(&self) -> &str {
            self.name
        }
        fn usage(&self) -> &str {
            self.usage
        }
        fn execute(&self, _args: CommandArgs, _shell: &mut Shell) -> Result<Outcome, FatalError> {
            Ok(Outcome::of(ExecResult::success()))
        }
    }

    fn fake(name: &'static str) -> Arc<dyn Command> {
        Arc::new(Fake {
            name,
            usage: "Usage: fake",
        })
    }

    #[test]
    fn register_and_lookup() {
        let mut reg = Registry::new();
        reg.register(fake("alpha")).unwrap();
        assert!(reg.lookup("alpha").is_some());
        assert!(reg.lookup("beta").is_none());
    }

    #[test]
    fn duplicate_name_is_fatal() {
        let mut reg = Registry::new();
        reg.register(fake("dup")).unwrap();
        assert_eq!(
            reg.register(fake("dup")),
            Err(FatalError::DuplicateCommand("dup".into()))
        );
    }

    #[test]
    fn empty_name_is_fatal() {
        let mut reg = Registry::new();
        assert_eq!(reg.register(fake("")), Err(FatalError::EmptyCommandName));
    }

    #[test]
    fn usage_must_lead_with_usage_line() {
        let mut reg = Registry::new();
        let bad = Arc::new(Fake {
            name: "bad",
            usage: "does things",
        });
        assert_eq!(
            reg.register(bad),
            Err(FatalError::MalformedUsage("bad".into()))
        );
    }

    #[test]
    fn names_are_sorted() {
        let mut reg = Registry::new();
        reg.register(fake("zed")).unwrap();
        reg.register(fake("ack")).unwrap();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(names, vec!["ack", "zed"]);
    }
}
