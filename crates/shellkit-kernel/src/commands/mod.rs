//! Command dispatch: the trait, the registry, and the builtin set.

pub mod builtin;
pub mod registry;
pub mod traits;

pub use registry::Registry;
pub use traits::{Command, CommandArgs, CompletionHint, RegistryObserver};
