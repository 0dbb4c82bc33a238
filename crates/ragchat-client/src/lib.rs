//! Transport layer between RagChat and a RAG backend.
//!
//! Defines the `RagTransport` async trait the conversation controller talks
//! to, and `RagClient`, its `reqwest` implementation.

pub mod client;
pub mod error;

use async_trait::async_trait;

use ragchat_core::types::{HealthResponse, ModelsResponse, QueryRequest, QueryResponse};

pub use client::RagClient;
pub use error::TransportError;

/// One request/response exchange per call against a fixed backend.
#[async_trait]
pub trait RagTransport: Send + Sync {
    /// Base URL requests are sent to, without a trailing slash.
    fn base_url(&self) -> &str;

    /// `POST /query`.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError>;

    /// `GET /models`.
    async fn list_models(&self) -> Result<ModelsResponse, TransportError>;

    /// `GET /health`.
    async fn health(&self) -> Result<HealthResponse, TransportError>;
}
