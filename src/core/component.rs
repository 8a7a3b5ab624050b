//! Persistent interactive components.
//!
//! A persistent component is registered as a recipe (a factory) keyed by a stable
//! custom id. Nothing about a live message is kept in memory: after a restart the
//! registry is rebuilt from the same recipes and an interaction carrying a known
//! custom id is routed to a freshly built component.

use crate::errors::{Error, Result};
use std::collections::HashMap;

type Factory<V> = Box<dyn Fn() -> V + Send + Sync>;

/// Custom id to component factory.
pub struct PersistentRegistry<V> {
    factories: HashMap<String, Factory<V>>,
}

impl<V> Default for PersistentRegistry<V> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<V> std::fmt::Debug for PersistentRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.factories.keys().collect();
        ids.sort();
        f.debug_struct("PersistentRegistry")
            .field("custom_ids", &ids)
            .finish()
    }
}

impl<V> PersistentRegistry<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory; a custom id may only be claimed once.
    pub fn register<F>(&mut self, custom_id: &str, factory: F) -> Result<()>
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        if self.contains(custom_id) {
            return Err(Error::DuplicateComponent {
                custom_id: custom_id.to_string(),
            });
        }
        self.install(custom_id.to_string(), Box::new(factory));
        Ok(())
    }

    pub(crate) fn install(&mut self, custom_id: String, factory: Factory<V>) {
        self.factories.insert(custom_id, factory);
    }

    #[must_use]
    pub fn contains(&self, custom_id: &str) -> bool {
        self.factories.contains_key(custom_id)
    }

    /// Builds the component handling `custom_id`, or `None` for unknown ids.
    #[must_use]
    pub fn resolve(&self, custom_id: &str) -> Option<V> {
        self.factories.get(custom_id).map(|factory| factory())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[derive(Debug, PartialEq)]
    struct AcceptRules;

    fn boot() -> PersistentRegistry<AcceptRules> {
        let mut registry = PersistentRegistry::new();
        registry.register("accept_rules", || AcceptRules).unwrap();
        registry
    }

    #[test]
    fn test_routes_after_restart() {
        let before = boot();
        assert_eq!(before.resolve("accept_rules"), Some(AcceptRules));
        drop(before);

        // Nothing survives but the recipe.
        let after = boot();
        assert_eq!(after.resolve("accept_rules"), Some(AcceptRules));
        assert_eq!(after.resolve("something_else"), None);
    }

    #[test]
    fn test_duplicate_custom_id_rejected() {
        let mut registry = boot();
        let result = registry.register("accept_rules", || AcceptRules);
        assert!(matches!(result, Err(Error::DuplicateComponent { .. })));
        assert_eq!(registry.len(), 1);
    }
}
