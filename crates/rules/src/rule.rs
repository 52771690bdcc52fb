//! The finished, validated rule objects produced by a [`Config`](crate::Config).

use std::fmt;

use infix_core::SeriesRecord;
use tracing::trace;

/// What a rule decided for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Forward the (possibly rewritten) record.
    Keep(SeriesRecord),
    /// Stop processing and discard the record.
    Drop,
}

/// A transformation or filtering action applied to series records.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Rule type name, as registered in the [`RuleRegistry`](crate::RuleRegistry).
    fn name(&self) -> &'static str;

    fn apply(&self, record: SeriesRecord) -> Outcome;
}

pub type BoxedRule = Box<dyn Rule>;

/// Run `record` through `rules` in order.
///
/// Returns `None` as soon as one rule drops the record.
pub fn apply_rules(rules: &[BoxedRule], mut record: SeriesRecord) -> Option<SeriesRecord> {
    for rule in rules {
        match rule.apply(record) {
            Outcome::Keep(next) => record = next,
            Outcome::Drop => {
                trace!(rule = rule.name(), "record dropped");
                return None;
            }
        }
    }
    Some(record)
}
