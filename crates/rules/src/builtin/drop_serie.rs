use infix_core::SeriesRecord;
use infix_filter::BoxedFilter;
use toml::Table;

use crate::config::{Config, FilterSlot};
use crate::loader::RuleError;
use crate::rule::{BoxedRule, Outcome, Rule};

/// Configuration of the `drop-serie` rule.
#[derive(Debug, Default)]
pub struct DropSerieConfig {
    /// Tested against the full series key. Required.
    pub drop_filter: Option<BoxedFilter>,
}

impl DropSerieConfig {
    pub const NAME: &'static str = "drop-serie";
}

impl Config for DropSerieConfig {
    fn sample(&self) -> &'static str {
        r#"
[[rules.drop-serie]]
# Drop every series of the cpu measurement
drop_filter = { measurement = { strings = { equal = "cpu" } } }
"#
    }

    fn filter_slots(&mut self) -> Vec<FilterSlot<'_>> {
        vec![FilterSlot::new("drop_filter", &mut self.drop_filter)]
    }

    fn decode(&mut self, _fields: Table) -> Result<(), toml::de::Error> {
        Ok(())
    }

    fn build(self: Box<Self>) -> Result<BoxedRule, RuleError> {
        let filter = self
            .drop_filter
            .ok_or_else(|| RuleError::validation("drop_filter is required"))?;
        Ok(Box::new(DropSerieRule { filter }))
    }
}

/// Drops records whose series key matches the filter.
#[derive(Debug)]
pub struct DropSerieRule {
    filter: BoxedFilter,
}

impl Rule for DropSerieRule {
    fn name(&self) -> &'static str {
        DropSerieConfig::NAME
    }

    fn apply(&self, record: SeriesRecord) -> Outcome {
        if self.filter.filter(&record.key.to_string()) {
            Outcome::Drop
        } else {
            Outcome::Keep(record)
        }
    }
}
