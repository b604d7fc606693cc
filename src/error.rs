//! Error types for the qlearn crate

use thiserror::Error;

/// Main error type for the qlearn crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("action space must contain at least one action")]
    EmptyActionSpace,

    #[error("action {action} is out of range for an action space of size {n}")]
    ActionOutOfRange { action: usize, n: usize },

    #[error("invalid hyperparameter {name}={value}: {reason}")]
    InvalidHyperparameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("episode already finished; reset the environment before stepping")]
    EpisodeFinished,

    #[error("unsupported policy format version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("policy artifact declares kind '{declared}' but holds state for '{found}'")]
    KindMismatch { declared: String, found: String },

    #[error("corrupt policy artifact: {message}")]
    CorruptArtifact { message: String },

    #[error("unknown {what} '{input}'. Expected one of: {expected}")]
    UnknownName {
        what: &'static str,
        input: String,
        expected: String,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
