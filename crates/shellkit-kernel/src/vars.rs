//! Variable store: builtin and user namespaces.
//!
//! Builtin variables are seeded by the host before the shell runs and
//! can only be updated, never deleted. User variables come and go via
//! `set`/`unset`. The builtin namespace shadows the user namespace in
//! both lookup and assignment.

use std::collections::HashMap;

use crate::error::VarError;
use crate::value::Value;

/// Two name → value mappings with builtin-shadows-user semantics.
#[derive(Debug, Clone, Default)]
pub struct VarStore {
    builtin: HashMap<String, Value>,
    user: HashMap<String, Value>,
}

/// What an assignment did, so the session can notify completion
/// providers only when a name is new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// A fresh user variable was created.
    Created,
    /// An existing builtin or user variable was overwritten.
    Updated,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builtin variable. Host-facing; builtins cannot be
    /// removed once defined.
    pub fn define_builtin(&mut self, name: impl Into<String>, value: Value) {
        self.builtin.insert(name.into(), value);
    }

    /// Assign a variable. Targets the builtin mapping when the name
    /// already exists there, otherwise creates/updates a user variable.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> SetOutcome {
        let name = name.into();
        if let Some(slot) = self.builtin.get_mut(&name) {
            *slot = value;
            return SetOutcome::Updated;
        }
        match self.user.insert(name, value) {
            Some(_) => SetOutcome::Updated,
            None => SetOutcome::Created,
        }
    }

    /// Look up a variable, builtin namespace first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.builtin.get(name).or_else(|| self.user.get(name))
    }

    /// Remove a user variable.
    pub fn unset(&mut self, name: &str) -> Result<(), VarError> {
        if self.builtin.contains_key(name) {
            return Err(VarError::ReadOnly(name.to_string()));
        }
        match self.user.remove(name) {
            Some(_) => Ok(()),
            None => Err(VarError::NotFound(name.to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin.contains_key(name)
    }

    /// Sorted builtin names, for `help --variables`.
    pub fn builtin_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builtin.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Sorted user names, for `help --variables`.
    pub fn user_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.user.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut vars = VarStore::new();
        assert_eq!(vars.set("x", Value::Int(5)), SetOutcome::Created);
        assert_eq!(vars.get("x"), Some(&Value::Int(5)));
        assert_eq!(vars.set("x", Value::Int(6)), SetOutcome::Updated);
        assert_eq!(vars.get("x"), Some(&Value::Int(6)));
    }

    #[test]
    fn builtin_shadows_user_on_assignment() {
        let mut vars = VarStore::new();
        vars.define_builtin("mode", Value::Str("fast".into()));
        // Assigning an existing builtin name updates builtin, never
        // creates a user entry.
        assert_eq!(vars.set("mode", Value::Str("slow".into())), SetOutcome::Updated);
        assert_eq!(vars.get("mode"), Some(&Value::Str("slow".into())));
        assert!(vars.user_names().is_empty());
    }

    #[test]
    fn builtin_checked_before_user() {
        let mut vars = VarStore::new();
        vars.define_builtin("x", Value::Int(1));
        // A user entry under the same name is unreachable.
        vars.user.insert("x".into(), Value::Int(2));
        assert_eq!(vars.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn unset_builtin_is_read_only() {
        let mut vars = VarStore::new();
        vars.define_builtin("version", Value::Str("1.0".into()));
        assert_eq!(
            vars.unset("version"),
            Err(VarError::ReadOnly("version".into()))
        );
        assert!(vars.contains("version"));
    }

    #[test]
    fn unset_missing_is_not_found() {
        let mut vars = VarStore::new();
        assert_eq!(vars.unset("ghost"), Err(VarError::NotFound("ghost".into())));
    }

    #[test]
    fn unset_removes_user_variable() {
        let mut vars = VarStore::new();
        vars.set("x", Value::Int(5));
        assert_eq!(vars.unset("x"), Ok(()));
        assert_eq!(vars.get("x"), None);
    }

    #[test]
    fn name_listings_are_sorted() {
        let mut vars = VarStore::new();
        vars.set("zeta", Value::Int(1));
        vars.set("alpha", Value::Int(2));
        assert_eq!(vars.user_names(), vec!["alpha", "zeta"]);
    }
}
