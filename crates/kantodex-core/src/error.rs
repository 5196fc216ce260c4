use thiserror::Error;

/// Top-level error type for the Kantodex system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and convert into `KantodexError` where calls cross
/// crate boundaries, so the `?` operator composes cleanly.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KantodexError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for KantodexError {
    fn from(err: toml::de::Error) -> Self {
        KantodexError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for KantodexError {
    fn from(err: toml::ser::Error) -> Self {
        KantodexError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for KantodexError {
    fn from(err: serde_json::Error) -> Self {
        KantodexError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Kantodex operations.
pub type Result<T> = std::result::Result<T, KantodexError>;
