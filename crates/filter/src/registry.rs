//! Filter kind registry and definition decoding.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::{logical, pattern, selector, strings, BoxedFilter};

/// Builds one filter kind from its parameters.
///
/// Receives the registry (for nested definitions), the dotted path of the
/// parameters being decoded, and the raw parameter value.
pub type FilterBuilder = fn(&FilterRegistry, &str, &Value) -> Result<BoxedFilter>;

/// Mapping from filter kind name to its builder.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    builders: IndexMap<String, FilterBuilder>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in filter kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("pass", logical::build_pass);
        registry.register("strings", strings::build);
        registry.register("pattern", pattern::build);
        registry.register("measurement", selector::build_measurement);
        registry.register("tag", selector::build_tag);
        registry.register("field", selector::build_field);
        registry.register("and", logical::build_and);
        registry.register("or", logical::build_or);
        registry.register("not", logical::build_not);
        registry
    }

    /// Register a builder for `kind`.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is already registered.
    pub fn register(&mut self, kind: impl Into<String>, builder: FilterBuilder) {
        let kind = kind.into();
        if self.builders.contains_key(&kind) {
            panic!("filter {} has already been registered", kind);
        }
        self.builders.insert(kind, builder);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Registered kind names, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    /// Build the filter configured under `field` in `table`.
    ///
    /// Returns `Ok(None)` when `table` has no `field` key.
    pub fn unmarshal(&self, table: &Table, field: &str) -> Result<Option<BoxedFilter>> {
        match table.get(field) {
            Some(value) => self.build(field, value).map(Some),
            None => Ok(None),
        }
    }

    /// Build a filter from a single-kind definition found at `path`.
    pub fn build(&self, path: &str, value: &Value) -> Result<BoxedFilter> {
        let table = value
            .as_table()
            .ok_or_else(|| FilterError::invalid(path, "expected a filter definition table"))?;

        let mut entries = table.iter();
        let (kind, params) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err(FilterError::invalid(path, "empty filter definition")),
            _ => {
                return Err(FilterError::invalid(
                    path,
                    format!("expected exactly one filter kind, found {}", table.len()),
                ))
            }
        };

        let builder = self
            .builders
            .get(kind.as_str())
            .ok_or_else(|| FilterError::UnknownKind {
                path: path.to_string(),
                kind: kind.clone(),
            })?;

        debug!(path, kind = %kind, "building filter");
        builder(self, &format!("{}.{}", path, kind), params)
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("kinds", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Deserialize a kind's parameters with serde.
pub(crate) fn decode_params<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T> {
    value.clone().try_into().map_err(|source| FilterError::Decode {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Filter;

    fn table(src: &str) -> Table {
        src.parse().expect("valid toml")
    }

    #[test]
    fn unmarshal_absent_field_is_none() {
        let registry = FilterRegistry::builtin();
        let t = table(r#"other = 1"#);
        assert!(registry.unmarshal(&t, "drop_filter").unwrap().is_none());
    }

    #[test]
    fn unmarshal_builds_nested_definition() {
        let registry = FilterRegistry::builtin();
        let t = table(r#"drop_filter = { measurement = { strings = { equal = "cpu" } } }"#);
        let filter = registry.unmarshal(&t, "drop_filter").unwrap().unwrap();
        assert!(filter.filter("cpu,host=a#!~#idle"));
        assert!(!filter.filter("mem,host=a#!~#free"));
    }

    #[test]
    fn rejects_non_table_definition() {
        let registry = FilterRegistry::builtin();
        let t = table(r#"drop_filter = "cpu""#);
        let err = registry.unmarshal(&t, "drop_filter").unwrap_err();
        assert!(matches!(err, FilterError::Invalid { ref path, .. } if path == "drop_filter"));
    }

    #[test]
    fn rejects_multiple_kinds() {
        let registry = FilterRegistry::builtin();
        let t = table(
            r#"drop_filter = { pass = {}, strings = { equal = "cpu" } }"#,
        );
        let err = registry.unmarshal(&t, "drop_filter").unwrap_err();
        assert!(err.to_string().contains("expected exactly one filter kind, found 2"));
    }

    #[test]
    fn rejects_empty_definition() {
        let registry = FilterRegistry::builtin();
        let t = table(r#"drop_filter = {}"#);
        let err = registry.unmarshal(&t, "drop_filter").unwrap_err();
        assert_eq!(err.to_string(), "drop_filter: empty filter definition");
    }

    #[test]
    fn unknown_kind_reports_path() {
        let registry = FilterRegistry::builtin();
        let t = table(r#"f = { not = { glob = { pattern = "*" } } }"#);
        let err = registry.unmarshal(&t, "f").unwrap_err();
        assert_eq!(err.to_string(), "f.not: unknown filter kind 'glob'");
    }

    #[test]
    #[should_panic(expected = "filter strings has already been registered")]
    fn duplicate_kind_panics() {
        let mut registry = FilterRegistry::builtin();
        registry.register("strings", logical::build_pass);
    }

    #[test]
    fn builtin_kinds_in_registration_order() {
        let registry = FilterRegistry::builtin();
        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(
            kinds,
            vec!["pass", "strings", "pattern", "measurement", "tag", "field", "and", "or", "not"]
        );
    }
}
