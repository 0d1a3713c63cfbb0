//! Core data types and error definitions for the summary pipeline.

use crate::{
    extraction::ExtractionError, render::RenderError, storage::StorageError,
    summarization::SummarizationClientError,
};
use serde::Serialize;
use thiserror::Error;

/// Contiguous slice of source text sized for one summarization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Trimmed segment text, sentences separated by `". "`.
    pub text: String,
    /// Whitespace-delimited word count of `text`.
    pub word_count: usize,
}

impl Segment {
    pub(crate) fn new(text: String) -> Self {
        let word_count = text.split_whitespace().count();
        Self { text, word_count }
    }

    /// Whether the segment carries no summarizable content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Summarization result for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSummary {
    /// 1-based position of the source segment.
    pub index: usize,
    /// Summary text returned by the adapter.
    pub text: String,
}

/// Titled, bulleted unit of the structured summary returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// `0` for the overview section, otherwise the part position.
    pub id: usize,
    /// Heading shown above the points.
    pub title: String,
    /// Ordered bullet points.
    pub points: Vec<String>,
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    /// Structured sections parsed from the annotated summary.
    pub sections: Vec<Section>,
    /// Storage name of the rendered document.
    pub document_name: String,
    /// Number of chunks sent to the summarizer.
    pub chunk_count: usize,
}

/// Errors emitted by the summary pipeline. Any of them aborts the whole request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upload's extension is outside the supported set.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// The document contained no readable text.
    #[error("File contains no readable text")]
    EmptyContent,
    /// Text could not be pulled out of a supported container.
    #[error("Failed to extract text: {0}")]
    Extraction(#[from] ExtractionError),
    /// The summarizer failed or timed out on one of the parts.
    #[error("Summarization failed for part {part}: {source}")]
    Adapter {
        /// 1-based part that failed.
        part: usize,
        /// Underlying adapter error.
        #[source]
        source: SummarizationClientError,
    },
    /// The summary could not be rendered or persisted.
    #[error("Failed to render summary document: {0}")]
    Render(#[from] RenderError),
    /// The uploaded source could not be stored.
    #[error("Failed to store upload: {0}")]
    Storage(#[from] StorageError),
}

impl PipelineError {
    /// Stable machine-readable failure tag.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::EmptyContent => "empty_content",
            Self::Extraction(_) => "extraction_failure",
            Self::Adapter { .. } => "adapter_failure",
            Self::Render(_) => "render_failure",
            Self::Storage(_) => "storage_failure",
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Adapter { .. })
    }
}
