//! Error types for the conversation controller.

use ragchat_client::TransportError;
use ragchat_core::error::RagChatError;

/// Errors from controller operations that can be refused.
///
/// Failed questions are not errors here: they become assistant messages.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("temperature must be a finite number, got {0}")]
    InvalidTemperature(f64),
    #[error("model name cannot be empty")]
    InvalidModel,
    #[error("backend error: {0}")]
    Transport(#[from] TransportError),
}

impl From<ChatError> for RagChatError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Transport(e) => e.into(),
            other => RagChatError::Config(other.to_string()),
        }
    }
}
