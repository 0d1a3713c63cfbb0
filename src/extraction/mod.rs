//! Plain-text extraction from uploaded documents.
//!
//! The supported formats form a closed set. Extraction is synchronous and CPU/disk bound, so
//! the pipeline runs it on the blocking pool.

mod office;

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while pulling text out of a document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The source file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A text file was not valid UTF-8.
    #[error("File is not valid UTF-8 text")]
    InvalidUtf8,
    /// The PDF could not be parsed.
    #[error("Failed to read PDF: {0}")]
    Pdf(String),
    /// An Office container or its XML parts could not be parsed.
    #[error("Failed to read Office document: {0}")]
    Office(String),
    /// The blocking extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Document formats accepted for summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Word (OOXML) document.
    Docx,
    /// Portable Document Format.
    Pdf,
    /// PowerPoint (OOXML) presentation.
    Pptx,
    /// Legacy PowerPoint extension, read as an OOXML presentation.
    Ppt,
    /// UTF-8 plain text.
    Txt,
    /// Markdown, rendered to HTML before summarization.
    Md,
}

impl DocumentFormat {
    /// Every accepted format.
    pub const ALL: [Self; 6] = [
        Self::Docx,
        Self::Pdf,
        Self::Pptx,
        Self::Ppt,
        Self::Txt,
        Self::Md,
    ];

    /// Resolve a format from a file extension, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == normalized)
    }

    /// Resolve a format from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical lowercase extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
            Self::Ppt => "ppt",
            Self::Txt => "txt",
            Self::Md => "md",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Collaborator that turns a stored document into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract the document's text.
    fn extract(&self, path: &Path, format: DocumentFormat) -> Result<String, ExtractionError>;
}

/// Extractor reading documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextExtractor;

impl TextExtractor for FileTextExtractor {
    fn extract(&self, path: &Path, format: DocumentFormat) -> Result<String, ExtractionError> {
        tracing::debug!(path = %path.display(), %format, "Extracting text");
        match format {
            DocumentFormat::Txt => read_utf8(path),
            DocumentFormat::Md => {
                let markdown = read_utf8(path)?;
                Ok(comrak::markdown_to_html(
                    &markdown,
                    &comrak::Options::default(),
                ))
            }
            DocumentFormat::Pdf => pdf_extract::extract_text(path)
                .map_err(|error| ExtractionError::Pdf(error.to_string())),
            DocumentFormat::Docx => office::extract_docx(&read_bytes(path)?),
            DocumentFormat::Pptx | DocumentFormat::Ppt => {
                office::extract_presentation(&read_bytes(path)?)
            }
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ExtractionError> {
    std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_utf8(path: &Path) -> Result<String, ExtractionError> {
    String::from_utf8(read_bytes(path)?).map_err(|_| ExtractionError::InvalidUtf8)
}
