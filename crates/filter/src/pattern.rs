//! Regular expression matching.

use regex::Regex;
use serde::Deserialize;
use toml::Value;

use crate::error::{FilterError, Result};
use crate::registry::{decode_params, FilterRegistry};
use crate::{BoxedFilter, Filter};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternParams {
    pattern: String,
}

/// Matches when the regex finds a match anywhere in the input.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    regex: Regex,
}

impl PatternFilter {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Filter for PatternFilter {
    fn filter(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

pub(crate) fn build(_: &FilterRegistry, path: &str, value: &Value) -> Result<BoxedFilter> {
    let params: PatternParams = decode_params(path, value)?;
    let regex = Regex::new(&params.pattern).map_err(|source| FilterError::Pattern {
        path: path.to_string(),
        source,
    })?;
    Ok(Box::new(PatternFilter::new(regex)))
}
