use infix_core::{SeriesKey, SeriesRecord};
use infix_filter::BoxedFilter;
use serde::Deserialize;
use toml::Table;

use crate::config::{decode_fields, Config, FilterSlot};
use crate::loader::RuleError;
use crate::rule::{BoxedRule, Outcome, Rule};

/// Configuration of the `rename-measurement` rule.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameMeasurementConfig {
    /// Tested against the measurement name. Required.
    #[serde(skip)]
    pub from: Option<BoxedFilter>,
    /// New measurement name, in escaped form (`\,` and `\ `). Required.
    pub to: String,
}

impl RenameMeasurementConfig {
    pub const NAME: &'static str = "rename-measurement";
}

impl Config for RenameMeasurementConfig {
    fn sample(&self) -> &'static str {
        r#"
[[rules.rename-measurement]]
# Rename every measurement starting with "cpu_" to "cpu"
from = { pattern = { pattern = "^cpu_" } }
to = "cpu"
"#
    }

    fn filter_slots(&mut self) -> Vec<FilterSlot<'_>> {
        vec![FilterSlot::new("from", &mut self.from)]
    }

    fn decode(&mut self, fields: Table) -> Result<(), toml::de::Error> {
        let from = self.from.take();
        *self = decode_fields(fields)?;
        self.from = from;
        Ok(())
    }

    fn build(self: Box<Self>) -> Result<BoxedRule, RuleError> {
        let from = self
            .from
            .ok_or_else(|| RuleError::validation("from is required"))?;
        if self.to.is_empty() {
            return Err(RuleError::validation("to must not be empty"));
        }
        SeriesKey::check_measurement(&self.to)
            .map_err(|e| RuleError::validation(format!("to: {}", e)))?;
        Ok(Box::new(RenameMeasurementRule { from, to: self.to }))
    }
}

/// Renames the measurement of matching records.
#[derive(Debug)]
pub struct RenameMeasurementRule {
    from: BoxedFilter,
    to: String,
}

impl Rule for RenameMeasurementRule {
    fn name(&self) -> &'static str {
        RenameMeasurementConfig::NAME
    }

    fn apply(&self, mut record: SeriesRecord) -> Outcome {
        if self.from.filter(&record.key.measurement) {
            record.key.measurement = self.to.clone();
        }
        Outcome::Keep(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{ConfigLoader, LoadError};

    fn load_one(src: &str) -> Result<BoxedRule, LoadError> {
        ConfigLoader::builtin()
            .load_str("rules.toml", src)
            .map(|mut rules| rules.remove(0))
    }

    #[test]
    fn sample_loads() {
        let rule = load_one(RenameMeasurementConfig::default().sample()).unwrap();
        assert_eq!(rule.name(), "rename-measurement");
    }

    #[test]
    fn renames_matching_measurement() {
        let rule = load_one(
            r#"
[[rules.rename-measurement]]
from = { strings = { equal = "cpu_old" } }
to = "cpu"
"#,
        )
        .unwrap();

        let record = SeriesRecord::parse("cpu_old,host=a#!~#idle 10").unwrap();
        match rule.apply(record) {
            Outcome::Keep(r) => assert_eq!(r.to_string(), "cpu,host=a#!~#idle 10"),
            Outcome::Drop => panic!("rename must not drop"),
        }

        let other = SeriesRecord::parse("mem,host=a#!~#free").unwrap();
        assert_eq!(rule.apply(other.clone()), Outcome::Keep(other));
    }

    #[test]
    fn to_is_required() {
        let err = load_one(
            r#"
[[rules.rename-measurement]]
from = { pass = {} }
"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "rules.toml: rename-measurement: to must not be empty");
    }

    #[test]
    fn to_must_be_an_escaped_measurement() {
        let err = load_one(
            r#"
[[rules.rename-measurement]]
from = { pass = {} }
to = "cpu total,x"
"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "rules.toml: rename-measurement: to: invalid measurement 'cpu total,x'"
        );

        let err = load_one(
            r##"
[[rules.rename-measurement]]
from = { pass = {} }
to = "cpu#!~#idle"
"##,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Rule {
                source: RuleError::Validation(_),
                ..
            }
        ));
    }

    #[test]
    fn renamed_record_parses_back() {
        let rule = load_one(
            r#"
[[rules.rename-measurement]]
from = { pass = {} }
to = 'cpu\ total\,x'
"#,
        )
        .unwrap();

        let record = SeriesRecord::parse("cpu,host=a#!~#idle 10").unwrap();
        let line = match rule.apply(record) {
            Outcome::Keep(r) => r.to_string(),
            Outcome::Drop => panic!("rename must not drop"),
        };
        assert_eq!(line, r"cpu\ total\,x,host=a#!~#idle 10");

        let reparsed = SeriesRecord::parse(&line).unwrap();
        assert_eq!(reparsed.key.measurement, r"cpu\ total\,x");
        assert_eq!(reparsed.key.tag("host"), Some("a"));
        assert_eq!(reparsed.timestamp, Some(10));
    }

    #[test]
    fn wrong_type_is_decode_error() {
        let err = load_one(
            r#"
[[rules.rename-measurement]]
from = { pass = {} }
to = 42
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Rule {
                source: RuleError::Decode(_),
                ..
            }
        ));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let rule = load_one(
            r#"
[[rules.rename-measurement]]
from = { pass = {} }
to = "cpu"
comment = "legacy collector"
"#,
        );
        assert!(rule.is_ok());
    }
}
