//! Summarization adapters used to condense a single chunk of text.
//!
//! Every call sees one chunk only; there is no cross-chunk context. The Ollama-backed client
//! issues HTTP requests directly to the runtime, while the extractive client keeps leading
//! sentences and needs no model at all.

mod extractive;

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

pub use extractive::ExtractiveSummarizationClient;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced while attempting to summarize a chunk.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// Provider did not answer within the configured timeout (seconds).
    #[error("Summarization timed out after {0}s")]
    Timeout(u64),
}

/// Request payload passed to the summarization provider.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Fully qualified model identifier understood by the provider.
    pub model: String,
    /// Chunk text to summarize.
    pub text: String,
    /// Minimum word count requested for the summary.
    pub min_words: usize,
    /// Maximum word count requested for the summary.
    pub max_words: usize,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Summarize the request's chunk.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Build the summarization client selected by configuration.
///
/// The client is created once at startup and shared by every request.
pub fn build_summarization_client(config: &Config) -> Arc<dyn SummarizationClient> {
    match config.summarization_provider {
        SummarizationProvider::Extractive => Arc::new(ExtractiveSummarizationClient),
        SummarizationProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            Arc::new(OllamaSummarizationClient::new(base_url))
        }
    }
}

/// Build the prompt sent to abstractive providers.
pub(crate) fn build_prompt(request: &SummarizationRequest) -> String {
    format!(
        "System: You summarize documents into clear, factual prose. Avoid speculation. \
         Write between {min} and {max} words as plain sentences with no headings, lists, or \
         preamble.\n\nSummarize the following text:\n\n{text}",
        min = request.min_words,
        max = request.max_words,
        text = request.text.trim(),
    )
}

/// Summarization client backed by a local Ollama runtime.
pub struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
}

impl OllamaSummarizationClient {
    /// Create a client targeting the given Ollama base URL.
    pub fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("docdigest/summary")
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(error = %error, "Falling back to default reqwest client");
                Client::new()
            });
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": request.model,
            "prompt": build_prompt(&request),
            "stream": false,
            "options": {
                // Greedy decoding keeps repeated runs stable.
                "temperature": 0.0,
                // Roughly 4 tokens per 3 words.
                "num_predict": request.max_words * 4 / 3,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}
