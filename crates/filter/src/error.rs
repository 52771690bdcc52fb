//! Errors raised while building filters from their definitions.

/// Errors that can occur while decoding a filter definition.
///
/// `path` is the dotted location of the offending definition, starting at
/// the rule field that holds it (e.g. `drop_filter.measurement.pattern`).
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The definition names a kind no builder is registered for.
    #[error("{path}: unknown filter kind '{kind}'")]
    UnknownKind { path: String, kind: String },

    /// The definition has the wrong shape.
    #[error("{path}: {reason}")]
    Invalid { path: String, reason: String },

    /// A `pattern` filter holds an invalid regular expression.
    #[error("{path}: invalid pattern: {source}")]
    Pattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    /// Parameters failed to deserialize.
    #[error("{path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl FilterError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        FilterError::Invalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for filter construction.
pub type Result<T> = std::result::Result<T, FilterError>;
