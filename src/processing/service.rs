//! Summary service coordinating extraction, summarization, rendering, and storage.

use crate::{
    extraction::{DocumentFormat, ExtractionError, TextExtractor},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        aggregate::{AnnotatedSummary, aggregate},
        chunking::chunk_text,
        sections::parse_sections,
        types::{PartSummary, PipelineError, Segment, SummaryOutcome},
    },
    render::{self, RenderError, RenderStyle},
    storage::{DocumentStore, StorageError},
    summarization::{SummarizationClient, SummarizationClientError, SummarizationRequest},
};
use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt, stream};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Tunables injected into the pipeline at construction.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Approximate word budget per chunk.
    pub chunk_max_tokens: usize,
    /// Lower word bound requested per part summary.
    pub summary_min_words: usize,
    /// Upper word bound requested per part summary.
    pub summary_max_words: usize,
    /// Model identifier forwarded to the summarizer.
    pub summarization_model: String,
    /// Per-chunk summarization timeout.
    pub summarization_timeout: Duration,
    /// Maximum summarization calls in flight per request.
    pub summarization_concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunk_max_tokens: crate::processing::chunking::DEFAULT_MAX_TOKENS,
            summary_min_words: 100,
            summary_max_words: 512,
            summarization_model: String::new(),
            summarization_timeout: Duration::from_secs(120),
            summarization_concurrency: 4,
        }
    }
}

/// Runs the full summary pipeline for one request at a time; share it through an `Arc`.
///
/// Every collaborator is handed in at construction, so tests can swap the summarizer,
/// extractor, or store for stubs.
pub struct SummaryService {
    settings: PipelineSettings,
    summarizer: Arc<dyn SummarizationClient>,
    extractor: Arc<dyn TextExtractor>,
    store: Arc<dyn DocumentStore>,
    metrics: SummaryMetrics,
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Store, extract, summarize, and render an uploaded document.
    async fn summarize_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        style: RenderStyle,
    ) -> Result<SummaryOutcome, PipelineError>;

    /// Read a rendered document back by name.
    async fn open_document(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryService {
    /// Build a service from its collaborators.
    pub fn new(
        settings: PipelineSettings,
        summarizer: Arc<dyn SummarizationClient>,
        extractor: Arc<dyn TextExtractor>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            settings,
            summarizer,
            extractor,
            store,
            metrics: SummaryMetrics::new(),
        }
    }

    /// Store, extract, summarize, and render an uploaded document.
    pub async fn summarize_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        style: RenderStyle,
    ) -> Result<SummaryOutcome, PipelineError> {
        let format = DocumentFormat::from_file_name(file_name).ok_or_else(|| {
            PipelineError::UnsupportedFormat(extension_of(file_name).unwrap_or_default())
        })?;
        tracing::info!(file = file_name, %format, bytes = bytes.len(), %style, "Summarizing upload");

        let path = self.store.save_upload(file_name, &bytes).await?;
        let extractor = Arc::clone(&self.extractor);
        let text = tokio::task::spawn_blocking(move || extractor.extract(&path, format))
            .await
            .map_err(|error| ExtractionError::Task(error.to_string()))??;

        self.summarize_text(&text, style).await
    }

    /// Summarize already extracted text and render it with `style`.
    pub async fn summarize_text(
        &self,
        text: &str,
        style: RenderStyle,
    ) -> Result<SummaryOutcome, PipelineError> {
        if text.trim().is_empty() {
            tracing::warn!("Rejecting document without readable text");
            return Err(PipelineError::EmptyContent);
        }

        let segments: Vec<Segment> = chunk_text(text, self.settings.chunk_max_tokens)
            .into_iter()
            .filter(|segment| !segment.is_blank())
            .collect();
        let chunk_count = segments.len();
        tracing::debug!(
            chunks = chunk_count,
            max_tokens = self.settings.chunk_max_tokens,
            "Chunked document"
        );

        let parts = self.summarize_segments(segments).await?;
        let annotated = aggregate(&parts);
        let sections = parse_sections(annotated.as_str());
        let document_name = self.render_and_store(&annotated, style).await?;

        self.metrics.record_document(chunk_count as u64);
        tracing::info!(
            chunks = chunk_count,
            sections = sections.len(),
            document = %document_name,
            "Summary completed"
        );

        Ok(SummaryOutcome {
            sections,
            document_name,
            chunk_count,
        })
    }

    /// Summarize segments concurrently; results keep segment order and the first failure
    /// aborts the rest.
    async fn summarize_segments(
        &self,
        segments: Vec<Segment>,
    ) -> Result<Vec<PartSummary>, PipelineError> {
        let concurrency = self.settings.summarization_concurrency.max(1);
        stream::iter(segments.into_iter().enumerate())
            .map(|(offset, segment)| self.summarize_segment(offset + 1, segment))
            .buffered(concurrency)
            .try_collect()
            .await
    }

    async fn summarize_segment(
        &self,
        index: usize,
        segment: Segment,
    ) -> Result<PartSummary, PipelineError> {
        let request = SummarizationRequest {
            model: self.settings.summarization_model.clone(),
            text: segment.text,
            min_words: self.settings.summary_min_words,
            max_words: self.settings.summary_max_words,
        };
        let timeout = self.settings.summarization_timeout;

        let result = match tokio::time::timeout(timeout, self.summarizer.generate_summary(request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SummarizationClientError::Timeout(timeout.as_secs())),
        };

        match result {
            Ok(text) => {
                tracing::debug!(part = index, words = text.split_whitespace().count(), "Part summarized");
                Ok(PartSummary { index, text })
            }
            Err(source) => {
                self.metrics.record_adapter_failure();
                tracing::warn!(part = index, error = %source, "Summarization failed");
                Err(PipelineError::Adapter {
                    part: index,
                    source,
                })
            }
        }
    }

    async fn render_and_store(
        &self,
        annotated: &AnnotatedSummary,
        style: RenderStyle,
    ) -> Result<String, PipelineError> {
        let annotated = annotated.clone();
        let document = tokio::task::spawn_blocking(move || render::render(&annotated, style))
            .await
            .map_err(|error| RenderError::Task(error.to_string()))??;
        self.store
            .save_rendered(&document.name, &document.bytes)
            .await
            .map_err(RenderError::Persist)?;
        Ok(document.name)
    }

    /// Read a rendered document back by name.
    pub async fn open_document(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        self.store.open_rendered(name).await
    }

    /// Return the current summarization metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| format!(".{}", extension.to_lowercase()))
}

#[async_trait]
impl SummaryApi for SummaryService {
    async fn summarize_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        style: RenderStyle,
    ) -> Result<SummaryOutcome, PipelineError> {
        SummaryService::summarize_document(self, file_name, bytes, style).await
    }

    async fn open_document(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        SummaryService::open_document(self, name).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryService::metrics_snapshot(self)
    }
}
