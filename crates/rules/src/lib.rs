//! Configuration-driven rule loading for series key rewriting.
//!
//! This crate provides:
//! - The Config → Rule contract every rule type implements
//! - A name-keyed [`RuleRegistry`] of configuration factories
//! - A TOML [`ConfigLoader`] that injects filter fields, decodes the rest
//!   with serde, and builds validated rules
//! - The built-in `rename-measurement`, `old-serie` and `drop-serie` rules

pub mod builtin;
pub mod config;
pub mod loader;
pub mod registry;
pub mod rule;

pub use config::{decode_fields, Config, FilterSlot};
pub use loader::{load_config, ConfigLoader, LoadError, RuleError};
pub use registry::{RuleFactory, RuleRegistry};
pub use rule::{apply_rules, BoxedRule, Outcome, Rule};
