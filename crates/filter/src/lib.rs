//! Composable predicates over series keys, built from TOML definitions.
//!
//! A filter definition is a table holding exactly one key, the filter kind;
//! its value carries the kind's parameters and may nest further definitions:
//!
//! ```toml
//! [rules.drop-serie.drop_filter]
//! and = [
//!     { measurement = { strings = { equal = "cpu" } } },
//!     { tag = { key = "host", filter = { pattern = { pattern = "^web-" } } } },
//! ]
//! ```
//!
//! Kinds are resolved through a [`FilterRegistry`], so new kinds can be added
//! without touching the decoding code.

mod error;
mod logical;
mod pattern;
mod registry;
mod selector;
mod strings;

use std::fmt;

pub use error::{FilterError, Result};
pub use logical::{AndFilter, NotFilter, OrFilter, PassFilter};
pub use pattern::PatternFilter;
pub use registry::{FilterBuilder, FilterRegistry};
pub use selector::{FieldFilter, MeasurementFilter, TagFilter};
pub use strings::StringsFilter;

/// A predicate deciding whether processing applies to an input.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Returns `true` when `input` matches.
    fn filter(&self, input: &str) -> bool;
}

pub type BoxedFilter = Box<dyn Filter>;
