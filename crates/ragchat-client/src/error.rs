//! Normalized transport failures.
//!
//! Network, server and decode failures all collapse into one
//! [`TransportError`]; the kind survives only in the message text.

use ragchat_core::error::RagChatError;
use reqwest::StatusCode;

/// A failed exchange with the RAG backend, described for humans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// The request never produced a response (connection refused, DNS, ...).
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Error: {}", err),
        }
    }

    /// The backend answered with a non-success status.
    pub fn server(status: StatusCode, url: &str, detail: Option<&str>) -> Self {
        let mut message = format!(
            "Error Code: {}\nMessage: Http failure response for {}: {} {}",
            status.as_u16(),
            url,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status"),
        );
        if let Some(detail) = detail {
            message.push_str("\nDetails: ");
            message.push_str(detail);
        }
        Self { message }
    }

    /// The backend answered 2xx but the body did not match the expected shape.
    pub fn decode(url: &str, err: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Error: Http failure during parsing for {}: {}", url, err),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for RagChatError {
    fn from(err: TransportError) -> Self {
        RagChatError::Transport(err.message)
    }
}

/// Pull the backend's `detail` out of an error body.
///
/// Strings are taken verbatim; any other non-null JSON value is rendered
/// compactly. Returns `None` for empty or non-JSON bodies.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
