//! The configuration side of the Config → Rule contract.

use std::fmt;

use infix_filter::BoxedFilter;
use serde::de::DeserializeOwned;
use toml::Table;

use crate::loader::RuleError;
use crate::rule::BoxedRule;

/// A filter-capable field of a [`Config`].
///
/// The loader fills `slot` from the table key equal to `name`, using the
/// filter registry rather than generic decoding.
pub struct FilterSlot<'a> {
    pub name: &'static str,
    pub slot: &'a mut Option<BoxedFilter>,
}

impl<'a> FilterSlot<'a> {
    pub fn new(name: &'static str, slot: &'a mut Option<BoxedFilter>) -> Self {
        Self { name, slot }
    }
}

/// Typed configuration for one rule type.
///
/// A blank value comes from the rule type's factory; the loader injects
/// filters, decodes the remaining fields, then calls [`Config::build`].
pub trait Config: fmt::Debug {
    /// An example document declaring one instance of this rule type.
    fn sample(&self) -> &'static str;

    /// Filter fields in declaration order. Defaults to none.
    fn filter_slots(&mut self) -> Vec<FilterSlot<'_>> {
        Vec::new()
    }

    /// Populate the ordinary fields from `fields`, which no longer holds
    /// the filter keys.
    fn decode(&mut self, fields: Table) -> Result<(), toml::de::Error>;

    /// Validate the populated fields and produce the rule.
    fn build(self: Box<Self>) -> Result<BoxedRule, RuleError>;
}

/// Deserialize the ordinary fields of a rule table.
///
/// Keys without a matching field are ignored; missing fields take their
/// `#[serde(default)]` value.
pub fn decode_fields<T: DeserializeOwned>(fields: Table) -> Result<T, toml::de::Error> {
    toml::Value::Table(fields).try_into()
}
