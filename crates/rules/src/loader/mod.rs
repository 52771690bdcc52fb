//! TOML configuration loader.
//!
//! Walks the `rules` section of a document and turns every rule instance
//! table into a validated [`Rule`](crate::Rule): the registry supplies a
//! blank config, filter fields are injected, the remaining fields are
//! decoded with serde, and the config builds the rule.

mod core;
mod error;


pub use self::core::{load_config, ConfigLoader, FILTERS_SECTION, RULES_SECTION};
pub use self::error::{LoadError, Result, RuleError};
