//! HTTP client for the RAG backend.
//!
//! Each call is one independent request/response exchange: no retries,
//! no caching, no state shared between calls beyond the connection pool.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use ragchat_core::config::BackendConfig;
use ragchat_core::types::{HealthResponse, ModelsResponse, QueryRequest, QueryResponse};

use crate::error::{extract_detail, TransportError};
use crate::RagTransport;

/// Talks to a RAG backend over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct RagClient {
    client: Client,
    base_url: String,
}

impl RagClient {
    /// Create a client for `base_url` using the HTTP client's default timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url),
        }
    }

    /// Create a client from the `[backend]` configuration section.
    pub fn from_config(config: &BackendConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(TransportError::network)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Backend unreachable");
            TransportError::network(e)
        })?;

        read_json(response, &url).await
    }
}

#[async_trait]
impl RagTransport for RagClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError> {
        let url = self.endpoint("/query");
        tracing::info!(
            url = %url,
            model = %request.model,
            temperature = request.temperature,
            has_context = request.context.is_some(),
            "Sending RAG query"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Backend unreachable");
                TransportError::network(e)
            })?;

        let answer: QueryResponse = read_json(response, &url).await?;
        tracing::info!(
            selected_model = %answer.selected_model,
            sources = answer.sources.len(),
            "RAG query answered"
        );
        Ok(answer)
    }

    async fn list_models(&self) -> Result<ModelsResponse, TransportError> {
        self.get_json("/models").await
    }

    async fn health(&self) -> Result<HealthResponse, TransportError> {
        self.get_json("/health").await
    }
}

/// Turn a response into `T`, mapping non-2xx and bad bodies to errors.
async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, TransportError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        let err = TransportError::server(status, url, detail.as_deref());
        tracing::error!(url = %url, status = status.as_u16(), "Backend returned an error status");
        return Err(err);
    }

    let bytes = response.bytes().await.map_err(|e| {
        tracing::error!(url = %url, error = %e, "Failed to read response body");
        TransportError::network(e)
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::error!(url = %url, error = %e, "Failed to parse response body");
        TransportError::decode(url, e)
    })
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
