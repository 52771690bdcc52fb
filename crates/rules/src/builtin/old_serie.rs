use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use infix_core::SeriesRecord;
use infix_filter::BoxedFilter;
use serde::Deserialize;
use toml::Table;

use crate::config::{decode_fields, Config, FilterSlot};
use crate::loader::RuleError;
use crate::rule::{BoxedRule, Outcome, Rule};

/// Configuration of the `old-serie` rule.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OldSerieConfig {
    /// Restricts which series are considered. Unset means every series.
    #[serde(skip)]
    pub filter: Option<BoxedFilter>,
    /// Cutoff time. Required.
    pub time: String,
    /// chrono format string for `time`; RFC 3339 when empty.
    pub format: String,
}

impl OldSerieConfig {
    pub const NAME: &'static str = "old-serie";
}

impl Config for OldSerieConfig {
    fn sample(&self) -> &'static str {
        r#"
[[rules.old-serie]]
# Drop disk series whose last point is older than 2020
time = "2020-01-01"
format = "%Y-%m-%d"
filter = { measurement = { strings = { startswith = "disk" } } }
"#
    }

    fn filter_slots(&mut self) -> Vec<FilterSlot<'_>> {
        vec![FilterSlot::new("filter", &mut self.filter)]
    }

    fn decode(&mut self, fields: Table) -> Result<(), toml::de::Error> {
        let filter = self.filter.take();
        *self = decode_fields(fields)?;
        self.filter = filter;
        Ok(())
    }

    fn build(self: Box<Self>) -> Result<BoxedRule, RuleError> {
        if self.time.is_empty() {
            return Err(RuleError::validation("time is required"));
        }
        let cutoff = parse_cutoff(&self.time, &self.format)?;
        let cutoff_nanos = cutoff
            .timestamp_nanos_opt()
            .ok_or_else(|| RuleError::validation(format!("time '{}' is out of range", self.time)))?;

        Ok(Box::new(OldSerieRule {
            filter: self.filter,
            cutoff,
            cutoff_nanos,
        }))
    }
}

fn parse_cutoff(time: &str, format: &str) -> Result<DateTime<Utc>, RuleError> {
    let invalid = |e: chrono::ParseError| {
        RuleError::validation(format!("invalid time '{}': {}", time, e))
    };

    if format.is_empty() {
        return DateTime::parse_from_rfc3339(time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(invalid);
    }

    // Date-only formats do not produce a NaiveDateTime; fall back to midnight.
    NaiveDateTime::parse_from_str(time, format)
        .map(|dt| dt.and_utc())
        .or_else(|_| {
            NaiveDate::parse_from_str(time, format).map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
        .map_err(invalid)
}

/// Drops records whose last point is before the cutoff.
///
/// Records without a timestamp are always kept.
#[derive(Debug)]
pub struct OldSerieRule {
    filter: Option<BoxedFilter>,
    cutoff: DateTime<Utc>,
    cutoff_nanos: i64,
}

impl OldSerieRule {
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }
}

impl Rule for OldSerieRule {
    fn name(&self) -> &'static str {
        OldSerieConfig::NAME
    }

    fn apply(&self, record: SeriesRecord) -> Outcome {
        let old = record.timestamp.is_some_and(|ts| ts < self.cutoff_nanos);
        let selected = self
            .filter
            .as_ref()
            .map(|f| f.filter(&record.key.to_string()))
            .unwrap_or(true);

        if old && selected {
            Outcome::Drop
        } else {
            Outcome::Keep(record)
        }
    }
}
