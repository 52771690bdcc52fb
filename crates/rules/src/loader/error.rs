//! Error types for rule loading.

use infix_filter::FilterError;

/// Errors raised while materializing a single rule instance.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// No factory is registered under the rule type name.
    #[error("no registered rule '{0}'")]
    UnknownRule(String),

    /// A filter field holds a malformed filter definition.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// An ordinary field has the wrong type.
    #[error(transparent)]
    Decode(#[from] toml::de::Error),

    /// Rule-specific validation failed in `Config::build`.
    #[error("{0}")]
    Validation(String),
}

impl RuleError {
    pub fn validation(message: impl Into<String>) -> Self {
        RuleError::Validation(message.into())
    }
}

/// Errors that abort loading a configuration file.
///
/// Nothing is loaded when any error occurs.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML.
    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    /// A section or rule entry has the wrong shape.
    #[error("{path}: invalid configuration {name}")]
    InvalidConfiguration { path: String, name: String },

    /// An unrecognized top-level section.
    #[error("{path}: unsupported config file format {name}")]
    UnsupportedFormat { path: String, name: String },

    /// A rule instance failed to load.
    #[error("{path}: {rule}: {source}")]
    Rule {
        path: String,
        rule: String,
        #[source]
        source: RuleError,
    },
}

/// Result alias for configuration loading.
pub type Result<T> = std::result::Result<T, LoadError>;
