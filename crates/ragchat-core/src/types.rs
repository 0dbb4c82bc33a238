use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Constants
// =============================================================================

/// Model identifiers the backend is known to serve.
///
/// Informational only: any model string is accepted and forwarded.
pub const KNOWN_MODELS: &[&str] = &["gpt-4o-mini", "grok-3", "DeepSeek-R1", "gpt-4o"];

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature used when nothing else is configured.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Pre-prompt used when nothing else is configured.
pub const DEFAULT_CONTEXT: &str = "You are an AI Assistant. Be brief in your answers. Answer ONLY with the facts listed in the retrieved text.";

/// Lowest temperature the controller will send.
pub const MIN_TEMPERATURE: f64 = 0.0;

/// Highest temperature the controller will send.
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Whether `model` is one of [`KNOWN_MODELS`].
pub fn is_known_model(model: &str) -> bool {
    KNOWN_MODELS.contains(&model)
}

// =============================================================================
// Transcript
// =============================================================================

/// A citation returned alongside an answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    /// Snippet of the retrieved chunk.
    pub content: String,
    /// Relevance score as reported by the backend, usually 0.0 to 1.0.
    pub score: f64,
}

/// One transcript entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Round-trip time of the request that produced this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

impl Message {
    fn new(content: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            is_user,
            timestamp: Utc::now(),
            sources: None,
            model: None,
            temperature: None,
            processing_time_ms: None,
        }
    }

    /// A user turn stamped with the parameters in effect when it was sent.
    pub fn user(content: impl Into<String>, model: &str, temperature: f64) -> Self {
        Self {
            model: Some(model.to_string()),
            temperature: Some(temperature),
            ..Self::new(content, true)
        }
    }

    /// An assistant turn with no attached metadata (greetings, errors).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }

    /// An assistant turn built from a backend answer.
    pub fn from_response(response: QueryResponse) -> Self {
        Self {
            sources: Some(response.sources),
            model: Some(response.selected_model),
            temperature: Some(response.temperature),
            ..Self::new(response.answer, false)
        }
    }

    pub fn with_processing_time(mut self, millis: u64) -> Self {
        self.processing_time_ms = Some(millis);
        self
    }

    /// Sources attached to this message, or an empty slice.
    pub fn sources(&self) -> &[Source] {
        self.sources.as_deref().unwrap_or(&[])
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Settings applied to the next outgoing question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub model: String,
    pub temperature: f64,
    /// Free-text pre-prompt; empty means none is sent.
    pub context: String,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            context: DEFAULT_CONTEXT.to_string(),
        }
    }
}

impl Parameters {
    /// Build the wire request for `question` from these parameters.
    ///
    /// An empty context is dropped rather than sent as `""`.
    pub fn to_request(&self, question: &str) -> QueryRequest {
        QueryRequest {
            user_question: question.to_string(),
            model: self.model.clone(),
            temperature: self.temperature,
            context: if self.context.is_empty() {
                None
            } else {
                Some(self.context.clone())
            },
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Body of `POST /query`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(rename = "userQuestion")]
    pub user_question: String,
    pub model: String,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Successful body of `POST /query`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub selected_model: String,
    pub temperature: f64,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Body of `GET /models`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub default: String,
}

/// Body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
