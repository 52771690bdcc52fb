use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("empty series key")]
    EmptyKey,

    #[error("missing measurement in series key '{0}'")]
    MissingMeasurement(String),

    #[error("malformed tag '{tag}' in series key '{key}'")]
    MalformedTag { key: String, tag: String },

    #[error("invalid measurement '{0}'")]
    InvalidMeasurement(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}
