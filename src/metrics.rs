use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_summarized: AtomicU64,
    chunks_summarized: AtomicU64,
    adapter_failures: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a summarized document and the number of chunks sent to the summarizer.
    pub fn record_document(&self, chunk_count: u64) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Record a part the summarizer failed on or timed out for.
    pub fn record_adapter_failure(&self) {
        self.adapter_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_summarized: self.documents_summarized.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            adapter_failures: self.adapter_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents summarized since startup.
    pub documents_summarized: u64,
    /// Total chunk count summarized across all documents.
    pub chunks_summarized: u64,
    /// Summarizer calls that failed or timed out; each one aborted its request.
    pub adapter_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_chunks() {
        let metrics = SummaryMetrics::new();
        metrics.record_document(2);
        metrics.record_document(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 2);
        assert_eq!(snapshot.chunks_summarized, 5);
    }

    #[test]
    fn adapter_failures_do_not_count_as_documents() {
        let metrics = SummaryMetrics::new();
        metrics.record_adapter_failure();
        metrics.record_adapter_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.adapter_failures, 2);
        assert_eq!(snapshot.documents_summarized, 0);
        assert_eq!(snapshot.chunks_summarized, 0);
    }

    #[test]
    fn snapshot_starts_empty() {
        let snapshot = SummaryMetrics::new().snapshot();
        assert_eq!(snapshot.documents_summarized, 0);
        assert_eq!(snapshot.chunks_summarized, 0);
        assert_eq!(snapshot.adapter_failures, 0);
    }
}
