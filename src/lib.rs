#![deny(missing_docs)]

//! Core library for the Docdigest document summarizer.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Plain-text extraction from uploaded documents.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Chunking, aggregation, and section parsing pipeline.
pub mod processing;
/// Styled PDF rendering of annotated summaries.
pub mod render;
/// Upload and output file storage.
pub mod storage;
/// Summarization client abstraction and adapters.
pub mod summarization;
