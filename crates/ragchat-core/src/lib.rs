//! Shared data model, configuration and error type for RagChat.

pub mod config;
pub mod error;
pub mod types;

pub use config::RagChatConfig;
pub use error::{RagChatError, Result};
pub use types::*;
