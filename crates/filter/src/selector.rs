//! Filters that test one component of a series key.
//!
//! The input is parsed as a [`SeriesKey`]; inputs that do not parse, or
//! that lack the selected component, never match.

use infix_core::SeriesKey;
use toml::Value;

use crate::error::{FilterError, Result};
use crate::registry::FilterRegistry;
use crate::{BoxedFilter, Filter};

/// Applies the inner filter to the measurement name.
#[derive(Debug)]
pub struct MeasurementFilter(pub BoxedFilter);

impl Filter for MeasurementFilter {
    fn filter(&self, input: &str) -> bool {
        SeriesKey::parse(input)
            .map(|key| self.0.filter(&key.measurement))
            .unwrap_or(false)
    }
}

/// Applies the inner filter to the value of one tag.
#[derive(Debug)]
pub struct TagFilter {
    pub key: String,
    pub inner: BoxedFilter,
}

impl Filter for TagFilter {
    fn filter(&self, input: &str) -> bool {
        SeriesKey::parse(input)
            .ok()
            .and_then(|key| key.tag(&self.key).map(|v| self.inner.filter(v)))
            .unwrap_or(false)
    }
}

/// Applies the inner filter to the field name.
#[derive(Debug)]
pub struct FieldFilter(pub BoxedFilter);

impl Filter for FieldFilter {
    fn filter(&self, input: &str) -> bool {
        SeriesKey::parse(input)
            .ok()
            .and_then(|key| key.field.map(|f| self.0.filter(&f)))
            .unwrap_or(false)
    }
}

pub(crate) fn build_measurement(
    registry: &FilterRegistry,
    path: &str,
    value: &Value,
) -> Result<BoxedFilter> {
    Ok(Box::new(MeasurementFilter(registry.build(path, value)?)))
}

pub(crate) fn build_field(registry: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    Ok(Box::new(FieldFilter(registry.build(path, value)?)))
}

pub(crate) fn build_tag(registry: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    let params = value
        .as_table()
        .ok_or_else(|| FilterError::invalid(path, "expected a table with key and filter"))?;

    if let Some(unknown) = params.keys().find(|k| *k != "key" && *k != "filter") {
        return Err(FilterError::invalid(path, format!("unknown parameter '{}'", unknown)));
    }

    let key = params
        .get("key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| FilterError::invalid(path, "key must be a non-empty string"))?;
    let inner = params
        .get("filter")
        .ok_or_else(|| FilterError::invalid(path, "filter is required"))?;

    Ok(Box::new(TagFilter {
        key: key.to_string(),
        inner: registry.build(&format!("{}.filter", path), inner)?,
    }))
}
