//! Boolean combinators over nested filter definitions.

use toml::Value;

use crate::error::{FilterError, Result};
use crate::registry::FilterRegistry;
use crate::{BoxedFilter, Filter};

/// Matches every input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassFilter;

impl Filter for PassFilter {
    fn filter(&self, _input: &str) -> bool {
        true
    }
}

/// Matches when every inner filter matches.
#[derive(Debug)]
pub struct AndFilter(pub Vec<BoxedFilter>);

impl Filter for AndFilter {
    fn filter(&self, input: &str) -> bool {
        self.0.iter().all(|f| f.filter(input))
    }
}

/// Matches when any inner filter matches.
#[derive(Debug)]
pub struct OrFilter(pub Vec<BoxedFilter>);

impl Filter for OrFilter {
    fn filter(&self, input: &str) -> bool {
        self.0.iter().any(|f| f.filter(input))
    }
}

/// Inverts the inner filter.
#[derive(Debug)]
pub struct NotFilter(pub BoxedFilter);

impl Filter for NotFilter {
    fn filter(&self, input: &str) -> bool {
        !self.0.filter(input)
    }
}

pub(crate) fn build_pass(_: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    match value.as_table() {
        Some(params) if params.is_empty() => Ok(Box::new(PassFilter)),
        Some(_) => Err(FilterError::invalid(path, "pass takes no parameters")),
        None => Err(FilterError::invalid(path, "expected an empty table")),
    }
}

pub(crate) fn build_and(registry: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    Ok(Box::new(AndFilter(build_all(registry, path, value)?)))
}

pub(crate) fn build_or(registry: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    Ok(Box::new(OrFilter(build_all(registry, path, value)?)))
}

pub(crate) fn build_not(registry: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    Ok(Box::new(NotFilter(registry.build(path, value)?)))
}

fn build_all(registry: &FilterRegistry, path: &str, value: &Value) -> Result<Vec<BoxedFilter>> {
    let items = value
        .as_array()
        .ok_or_else(|| FilterError::invalid(path, "expected an array of filter definitions"))?;
    if items.is_empty() {
        return Err(FilterError::invalid(path, "at least one filter definition is required"));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| registry.build(&format!("{}[{}]", path, i), item))
        .collect()
}
