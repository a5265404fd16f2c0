//! Registration storage.
//!
//! The registry maps an [`Identifier`] to the [`Registration`] that
//! says how to build it. A later registration under the same
//! identifier replaces the earlier one wholesale.

use std::collections::HashMap;

use tracing::debug;

use crate::definition::Definition;
use crate::identifier::Identifier;
use crate::scope::Scope;

/// Registration entry for a single identifier.
#[derive(Debug, Clone)]
pub(crate) struct Registration {
    pub identifier: Identifier,
    pub scope: Scope,
    pub definition: Definition,
}

/// Stores all registrations of one container.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    registrations: HashMap<Identifier, Registration>,
}

impl Registry {
    /// Inserts a registration, returning the one it replaced.
    pub fn insert(&mut self, registration: Registration) -> Option<Registration> {
        debug!(
            identifier = %registration.identifier,
            scope = %registration.scope,
            kind = registration.definition.kind(),
            "Registered dependency"
        );
        self.registrations
            .insert(registration.identifier.clone(), registration)
    }

    pub fn get(&self, identifier: &str) -> Option<&Registration> {
        self.registrations.get(identifier)
    }

    pub fn remove(&mut self, identifier: &str) -> Option<Registration> {
        self.registrations.remove(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.registrations.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.registrations.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_reg(identifier: &'static str, scope: Scope, value: i32) -> Registration {
        Registration {
            identifier: identifier.into(),
            scope,
            definition: Definition::value(value),
        }
    }

    #[test]
    fn insert_and_get() {
        let mut reg = Registry::default();
        assert!(reg.insert(make_reg("answer", Scope::Transient, 42)).is_none());
        assert!(reg.contains("answer"));
        assert_eq!(reg.get("answer").unwrap().scope, Scope::Transient);
    }

    #[test]
    fn last_write_wins() {
        let mut reg = Registry::default();
        reg.insert(make_reg("answer", Scope::Transient, 1));
        let replaced = reg.insert(make_reg("answer", Scope::Singleton, 2));

        assert_eq!(replaced.unwrap().scope, Scope::Transient);
        assert_eq!(reg.get("answer").unwrap().scope, Scope::Singleton);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut reg = Registry::default();
        reg.insert(make_reg("answer", Scope::Transient, 42));
        assert!(reg.remove("answer").is_some());
        assert!(reg.remove("answer").is_none());
        assert!(!reg.contains("answer"));
    }
}
