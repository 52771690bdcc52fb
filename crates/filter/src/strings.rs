//! Plain string comparisons.

use serde::Deserialize;
use toml::Value;

use crate::error::{FilterError, Result};
use crate::registry::{decode_params, FilterRegistry};
use crate::{BoxedFilter, Filter};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StringsParams {
    #[serde(default)]
    equal: Option<String>,
    #[serde(default)]
    contains: Option<String>,
    #[serde(default)]
    startswith: Option<String>,
    #[serde(default)]
    endswith: Option<String>,
    #[serde(default)]
    ignorecase: bool,
}

/// Matches when every configured comparison holds.
#[derive(Debug, Clone, Default)]
pub struct StringsFilter {
    pub equal: Option<String>,
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub ignore_case: bool,
}

impl StringsFilter {
    pub fn equal(value: impl Into<String>) -> Self {
        Self {
            equal: Some(value.into()),
            ..Self::default()
        }
    }

    fn normalize(&self, s: &str) -> String {
        if self.ignore_case {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    }
}

impl Filter for StringsFilter {
    fn filter(&self, input: &str) -> bool {
        let input = self.normalize(input);
        let holds = |expected: &Option<String>, check: fn(&str, &str) -> bool| {
            expected
                .as_deref()
                .map(|e| check(&input, &self.normalize(e)))
                .unwrap_or(true)
        };

        holds(&self.equal, |i, e| i == e)
            && holds(&self.contains, |i, e| i.contains(e))
            && holds(&self.starts_with, |i, e| i.starts_with(e))
            && holds(&self.ends_with, |i, e| i.ends_with(e))
    }
}

pub(crate) fn build(_: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    let params: StringsParams = decode_params(path, value)?;
    if params.equal.is_none()
        && params.contains.is_none()
        && params.startswith.is_none()
        && params.endswith.is_none()
    {
        return Err(FilterError::invalid(
            path,
            "one of equal, contains, startswith or endswith is required",
        ));
    }

    Ok(Box::new(StringsFilter {
        equal: params.equal,
        contains: params.contains,
        starts_with: params.startswith,
        ends_with: params.endswith,
        ignore_case: params.ignorecase,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_from(src: &str) -> Result<BoxedFilter> {
        let value: Value = Value::Table(src.parse().unwrap());
        build(&FilterRegistry::builtin(), "f.strings", &value)
    }

    #[test]
    fn equal_is_exact() {
        let f = build_from(r#"equal = "cpu""#).unwrap();
        assert!(f.filter("cpu"));
        assert!(!f.filter("cpu2"));
        assert!(!f.filter("CPU"));
    }

    #[test]
    fn conditions_combine() {
        let f = build_from(
            r#"
startswith = "disk"
endswith = "_io"
"#,
        )
        .unwrap();
        assert!(f.filter("disk_io"));
        assert!(f.filter("diskstats_io"));
        assert!(!f.filter("disk_free"));
        assert!(!f.filter("net_io"));
    }

    #[test]
    fn ignorecase_applies_to_both_sides() {
        let f = build_from(
            r#"
contains = "Idle"
ignorecase = true
"#,
        )
        .unwrap();
        assert!(f.filter("usage_IDLE"));
    }

    #[test]
    fn requires_a_condition() {
        let err = build_from(r#"ignorecase = true"#).unwrap_err();
        assert!(matches!(err, FilterError::Invalid { .. }));
    }

    #[test]
    fn unknown_parameter_is_decode_error() {
        let err = build_from(r#"equals = "cpu""#).unwrap_err();
        assert!(matches!(err, FilterError::Decode { ref path, .. } if path == "f.strings"));
    }
}
