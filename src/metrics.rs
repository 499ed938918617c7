use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity.
#[derive(Default)]
pub struct IngestMetrics {
    documents_processed: AtomicU64,
    chunks_produced: AtomicU64,
    bytes_processed: AtomicU64,
    documents_truncated: AtomicU64,
    validation_failures: AtomicU64,
    extraction_failures: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed document, its chunk count, and its upload size.
    pub fn record_document(&self, chunk_count: u64, bytes: u64, truncated: bool) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.chunks_produced
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.bytes_processed.fetch_add(bytes, Ordering::Relaxed);
        if truncated {
            self.documents_truncated.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an upload rejected by the validator.
    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an upload whose text could not be extracted.
    pub fn record_extraction_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            chunks_produced: self.chunks_produced.load(Ordering::Relaxed),
            bytes_processed: self.bytes_processed.load(Ordering::Relaxed),
            documents_truncated: self.documents_truncated.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents processed successfully since startup.
    pub documents_processed: u64,
    /// Total chunks produced across processed documents.
    pub chunks_produced: u64,
    /// Total upload bytes across processed documents.
    pub bytes_processed: u64,
    /// Processed documents whose text hit the length guard.
    pub documents_truncated: u64,
    /// Uploads rejected by validation.
    pub validation_failures: u64,
    /// Uploads that failed text extraction.
    pub extraction_failures: u64,
}
