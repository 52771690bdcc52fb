//! Core [`ConfigLoader`]: document walking and per-instance rule loading.

use std::fs;
use std::path::Path;

use infix_filter::{FilterError, FilterRegistry};
use toml::{Table, Value};
use tracing::{debug, info};

use crate::config::{Config, FilterSlot};
use crate::registry::RuleRegistry;
use crate::rule::BoxedRule;

use super::error::{LoadError, Result, RuleError};

/// Top-level section mapping rule type names to arrays of instance tables.
pub const RULES_SECTION: &str = "rules";
/// Reserved top-level section; accepted and ignored.
pub const FILTERS_SECTION: &str = "filters";

/// Loads rule configuration documents.
///
/// The loader carries no rule-specific logic: rule types come from the
/// [`RuleRegistry`], filter kinds from the [`FilterRegistry`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rules: RuleRegistry,
    filters: FilterRegistry,
}

impl ConfigLoader {
    pub fn new(rules: RuleRegistry, filters: FilterRegistry) -> Self {
        Self { rules, filters }
    }

    /// Loader wired with every built-in rule type and filter kind.
    pub fn builtin() -> Self {
        Self::new(RuleRegistry::builtin(), FilterRegistry::builtin())
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Read and load the configuration file at `path`.
    ///
    /// Read and TOML syntax errors are returned unchanged; every other error
    /// is prefixed with the path.
    pub fn load_config(&self, path: impl AsRef<Path>) -> Result<Vec<BoxedRule>> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let rules = self.load_str(&path.display().to_string(), &contents)?;
        info!(path = %path.display(), rules = rules.len(), "loaded rule configuration");
        Ok(rules)
    }

    /// Load a configuration held in memory. `origin` stands in for the file
    /// path in error messages.
    pub fn load_str(&self, origin: &str, contents: &str) -> Result<Vec<BoxedRule>> {
        let document: Table = contents.parse()?;
        self.load_document(origin, &document)
    }

    /// Walk the top-level sections of a parsed document, in document order.
    pub fn load_document(&self, origin: &str, document: &Table) -> Result<Vec<BoxedRule>> {
        let mut rules = Vec::new();

        for (name, value) in document {
            let section = value
                .as_table()
                .ok_or_else(|| invalid_configuration(origin, name))?;

            match name.as_str() {
                RULES_SECTION => self.load_rules_section(origin, section, &mut rules)?,
                FILTERS_SECTION => debug!(path = origin, "skipping filters section"),
                _ => {
                    return Err(LoadError::UnsupportedFormat {
                        path: origin.to_string(),
                        name: name.clone(),
                    })
                }
            }
        }

        Ok(rules)
    }

    fn load_rules_section(
        &self,
        origin: &str,
        section: &Table,
        rules: &mut Vec<BoxedRule>,
    ) -> Result<()> {
        for (rule_name, value) in section {
            let instances = value
                .as_array()
                .and_then(|items| items.iter().map(Value::as_table).collect::<Option<Vec<_>>>())
                .ok_or_else(|| invalid_configuration(origin, rule_name))?;

            for (index, table) in instances.into_iter().enumerate() {
                let rule = self
                    .load_rule(rule_name, table)
                    .map_err(|source| LoadError::Rule {
                        path: origin.to_string(),
                        rule: rule_name.clone(),
                        source,
                    })?;
                debug!(path = origin, rule = %rule_name, index, "loaded rule instance");
                rules.push(rule);
            }
        }
        Ok(())
    }

    /// Materialize one rule instance table.
    ///
    /// Filters are injected before generic decoding so that the decoder
    /// never sees the filter sub-tables.
    pub fn load_rule(
        &self,
        rule_name: &str,
        table: &Table,
    ) -> std::result::Result<BoxedRule, RuleError> {
        let mut config = self.rules.create(rule_name)?;

        let filter_fields = self.inject_filters(config.as_mut(), table)?;

        let fields: Table = table
            .iter()
            .filter(|(key, _)| !filter_fields.iter().any(|name| *name == key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        config.decode(fields)?;

        config.build()
    }

    /// Fill every declared filter slot whose key is present in `table`.
    /// Returns the names of all declared filter fields.
    pub(super) fn inject_filters(
        &self,
        config: &mut dyn Config,
        table: &Table,
    ) -> std::result::Result<Vec<&'static str>, FilterError> {
        let mut names = Vec::new();
        for FilterSlot { name, slot } in config.filter_slots() {
            if let Some(filter) = self.filters.unmarshal(table, name)? {
                *slot = Some(filter);
            }
            names.push(name);
        }
        Ok(names)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::builtin()
    }
}

fn invalid_configuration(origin: &str, name: &str) -> LoadError {
    LoadError::InvalidConfiguration {
        path: origin.to_string(),
        name: name.to_string(),
    }
}

/// Load the rules declared in the TOML file at `path` using the built-in
/// rule types and filter kinds.
pub fn load_config(path: impl AsRef<Path>) -> Result<Vec<BoxedRule>> {
    ConfigLoader::builtin().load_config(path)
}
