//! Name-keyed registry of rule configuration factories.

use std::fmt;

use indexmap::IndexMap;

use crate::config::Config;
use crate::loader::RuleError;

/// Produces a blank configuration for one rule type.
pub type RuleFactory = fn() -> Box<dyn Config>;

/// Mapping from rule type name to the factory for its configuration.
///
/// Built once at startup (see [`RuleRegistry::builtin`]) and read-only
/// while loading.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: IndexMap<String, RuleFactory>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in rule type.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_all(&mut registry);
        registry
    }

    /// Register `factory` under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered. Two rule types sharing a
    /// name is a wiring bug, not a configuration error.
    pub fn register(&mut self, name: impl Into<String>, factory: RuleFactory) {
        let name = name.into();
        if self.factories.contains_key(&name) {
            panic!("rule {} has already been registered", name);
        }
        self.factories.insert(name, factory);
    }

    /// Create a blank configuration for the rule type `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Config>, RuleError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered rule type names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Sample document for the rule type `name`.
    pub fn sample(&self, name: &str) -> Result<&'static str, RuleError> {
        self.create(name).map(|config| config.sample())
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::DropSerieConfig;

    fn drop_serie() -> Box<dyn Config> {
        Box::<DropSerieConfig>::default()
    }

    #[test]
    fn builtin_registers_every_rule_type() {
        let registry = RuleRegistry::builtin();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["rename-measurement", "old-serie", "drop-serie"]);
    }

    #[test]
    fn create_returns_blank_config() {
        let mut registry = RuleRegistry::new();
        registry.register("drop-serie", drop_serie);
        let mut config = registry.create("drop-serie").unwrap();
        let slots = config.filter_slots();
        assert_eq!(slots.len(), 1);
        assert!(slots[0].slot.is_none());
    }

    #[test]
    fn create_unknown_rule() {
        let registry = RuleRegistry::new();
        let err = registry.create("rename-field").unwrap_err();
        assert!(matches!(err, RuleError::UnknownRule(ref name) if name == "rename-field"));
        assert_eq!(err.to_string(), "no registered rule 'rename-field'");
    }

    #[test]
    #[should_panic(expected = "rule drop-serie has already been registered")]
    fn duplicate_registration_panics() {
        let mut registry = RuleRegistry::new();
        registry.register("drop-serie", drop_serie);
        registry.register("drop-serie", drop_serie);
    }

    #[test]
    fn duplicate_registration_keeps_first_factory() {
        let mut registry = RuleRegistry::builtin();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.register("old-serie", drop_serie);
        }));
        assert!(result.is_err());
        let sample = registry.sample("old-serie").unwrap();
        assert!(sample.contains("[[rules.old-serie]]"));
    }
}
