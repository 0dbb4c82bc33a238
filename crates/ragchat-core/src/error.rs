use thiserror::Error;

/// Top-level error type for RagChat.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for RagChatError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RagChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<toml::de::Error> for RagChatError {
    fn from(err: toml::de::Error) -> Self {
        RagChatError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RagChatError {
    fn from(err: toml::ser::Error) -> Self {
        RagChatError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RagChatError {
    fn from(err: serde_json::Error) -> Self {
        RagChatError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for RagChat operations.
pub type Result<T> = std::result::Result<T, RagChatError>;
