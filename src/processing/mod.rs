//! Summary pipeline: chunking, per-chunk summarization, aggregation, and section parsing.

pub mod aggregate;
pub mod chunking;
pub mod sections;
mod service;
pub mod types;

pub use aggregate::{AnnotatedSummary, PartMarker, aggregate};
pub use chunking::chunk_text;
pub use sections::parse_sections;
pub use service::{PipelineSettings, SummaryApi, SummaryService};
pub use types::{PartSummary, PipelineError, Section, Segment, SummaryOutcome};
