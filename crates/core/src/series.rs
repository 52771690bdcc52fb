//! Series keys and the records the rule pipeline rewrites.
//!
//! A series key has the shape `measurement[,tag=value...][#!~#field]`.
//! Components are kept in their escaped form so that formatting a parsed
//! key reproduces the input byte for byte. A key ending in the separator
//! carries an empty field.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::CoreError;

/// Separator between the series part of a key and its field name.
pub const FIELD_SEPARATOR: &str = "#!~#";

/// A parsed series key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub field: Option<String>,
}

impl SeriesKey {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            field: None,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Value of the first tag named `key`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn parse(input: &str) -> Result<Self, CoreError> {
        if input.is_empty() {
            return Err(CoreError::EmptyKey);
        }

        let (series, field) = match input.split_once(FIELD_SEPARATOR) {
            Some((series, field)) => (series, Some(field.to_string())),
            None => (input, None),
        };

        let mut parts = split_unescaped(series, ',').into_iter();
        let measurement = match parts.next() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => return Err(CoreError::MissingMeasurement(input.to_string())),
        };

        let mut tags = Vec::new();
        for tag in parts {
            let pair = find_unescaped(tag, '=')
                .map(|idx| (&tag[..idx], &tag[idx + 1..]))
                .filter(|(k, _)| !k.is_empty());
            match pair {
                Some((k, v)) => tags.push((k.to_string(), v.to_string())),
                None => {
                    return Err(CoreError::MalformedTag {
                        key: input.to_string(),
                        tag: tag.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            measurement,
            tags,
            field,
        })
    }

    /// Check that `name` can stand as the measurement of a key, in escaped form.
    ///
    /// Commas and spaces must be escaped with a backslash, the field
    /// separator may not appear, and a trailing backslash would escape
    /// whatever follows the measurement.
    pub fn check_measurement(name: &str) -> Result<(), CoreError> {
        let invalid = name.is_empty()
            || name.contains(FIELD_SEPARATOR)
            || find_unescaped(name, ',').is_some()
            || find_unescaped(name, ' ').is_some()
            || ends_with_escape(name);
        if invalid {
            return Err(CoreError::InvalidMeasurement(name.to_string()));
        }
        Ok(())
    }
}

impl FromStr for SeriesKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.measurement)?;
        for (k, v) in &self.tags {
            write!(f, ",{}={}", k, v)?;
        }
        if let Some(field) = &self.field {
            write!(f, "{}{}", FIELD_SEPARATOR, field)?;
        }
        Ok(())
    }
}

/// One input line: a series key and, optionally, the unix-nanosecond
/// timestamp of its most recent point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRecord {
    pub key: SeriesKey,
    pub timestamp: Option<i64>,
}

impl SeriesRecord {
    pub fn new(key: SeriesKey) -> Self {
        Self {
            key,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Parse `<key> [<unix-nanos>]`. An escaped space (`\ `) stays part of the key.
    pub fn parse(line: &str) -> Result<Self, CoreError> {
        let line = line.trim();
        match line.rsplit_once(' ') {
            Some((key, ts)) if !ends_with_escape(key) => {
                let timestamp = ts
                    .parse::<i64>()
                    .map_err(|_| CoreError::InvalidTimestamp(ts.to_string()))?;
                Ok(Self {
                    key: SeriesKey::parse(key.trim_end())?,
                    timestamp: Some(timestamp),
                })
            }
            _ => Ok(Self::new(SeriesKey::parse(line)?)),
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.timestamp.map(DateTime::from_timestamp_nanos)
    }
}

impl FromStr for SeriesRecord {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SeriesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp {
            Some(ts) => write!(f, "{} {}", self.key, ts),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Byte offset of the first `sep` not preceded by a backslash.
fn find_unescaped(s: &str, sep: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in s.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            c if c == sep && !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

/// Whether `s` ends in an odd run of backslashes, escaping the next character.
fn ends_with_escape(s: &str) -> bool {
    s.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(idx) = find_unescaped(rest, sep) {
        parts.push(&rest[..idx]);
        rest = &rest[idx + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_key() {
        let key = SeriesKey::parse("cpu,host=a,region=eu#!~#usage_idle").unwrap();
        assert_eq!(key.measurement, "cpu");
        assert_eq!(key.tag("host"), Some("a"));
        assert_eq!(key.tag("region"), Some("eu"));
        assert_eq!(key.field.as_deref(), Some("usage_idle"));
    }

    #[test]
    fn parse_measurement_only() {
        let key = SeriesKey::parse("mem").unwrap();
        assert_eq!(key, SeriesKey::new("mem"));
        assert_eq!(key.to_string(), "mem");
    }

    #[test]
    fn escaped_comma_stays_in_tag_value() {
        let raw = r"disk,path=/a\,b#!~#free";
        let key = SeriesKey::parse(raw).unwrap();
        assert_eq!(key.tag("path"), Some(r"/a\,b"));
        assert_eq!(key.to_string(), raw);
    }

    #[test]
    fn empty_field_is_kept() {
        let key = SeriesKey::parse("cpu,host=a#!~#").unwrap();
        assert_eq!(key.field.as_deref(), Some(""));
        assert_eq!(key.to_string(), "cpu,host=a#!~#");
        assert_ne!(key, SeriesKey::parse("cpu,host=a").unwrap());
    }

    #[test]
    fn measurement_must_be_escaped() {
        assert!(SeriesKey::check_measurement("cpu").is_ok());
        assert!(SeriesKey::check_measurement(r"cpu\ total\,x").is_ok());
        assert!(SeriesKey::check_measurement(r"C:\\").is_ok());

        for name in ["", "cpu total", "cpu,x", "cpu#!~#idle", r"cpu\"] {
            assert_eq!(
                SeriesKey::check_measurement(name),
                Err(CoreError::InvalidMeasurement(name.to_string())),
                "{name:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(SeriesKey::parse(""), Err(CoreError::EmptyKey));
        assert!(matches!(
            SeriesKey::parse(",host=a"),
            Err(CoreError::MissingMeasurement(_))
        ));
        assert!(matches!(
            SeriesKey::parse("cpu,host"),
            Err(CoreError::MalformedTag { .. })
        ));
    }

    #[test]
    fn record_with_timestamp() {
        let record: SeriesRecord = "cpu,host=a#!~#value 1577836800000000000".parse().unwrap();
        assert_eq!(record.key.measurement, "cpu");
        assert_eq!(record.timestamp, Some(1_577_836_800_000_000_000));
        assert_eq!(
            record.datetime().unwrap().to_rfc3339(),
            "2020-01-01T00:00:00+00:00"
        );
        assert_eq!(record.to_string(), "cpu,host=a#!~#value 1577836800000000000");
    }

    #[test]
    fn record_without_timestamp() {
        let record = SeriesRecord::parse("cpu,host=a").unwrap();
        assert_eq!(record.timestamp, None);
        assert!(record.datetime().is_none());
    }

    #[test]
    fn record_escaped_space_stays_in_key() {
        let record = SeriesRecord::parse(r"disk,path=a\ b").unwrap();
        assert_eq!(record.timestamp, None);
        assert_eq!(record.key.tag("path"), Some(r"a\ b"));
    }

    #[test]
    fn record_key_ending_in_escaped_backslash_keeps_timestamp() {
        let raw = r"disk,path=C:\\ 1000";
        let record = SeriesRecord::parse(raw).unwrap();
        assert_eq!(record.timestamp, Some(1000));
        assert_eq!(record.key.tag("path"), Some(r"C:\\"));
        assert_eq!(record.to_string(), raw);
    }

    #[test]
    fn record_rejects_non_numeric_timestamp() {
        assert_eq!(
            SeriesRecord::parse("cpu yesterday"),
            Err(CoreError::InvalidTimestamp("yesterday".to_string()))
        );
    }
}
