//! Ingestion service coordinating validation, extraction, and chunking.

use crate::{
    metrics::{IngestMetrics, MetricsSnapshot},
    processing::{
        chunking::{apply_length_guard, chunk_text},
        context::build_context,
        extract::extract_text,
        types::{ExtractionResult, IngestError, IngestLimits, UploadedDocument},
        validate::validate,
    },
};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Runs the upload pipeline: validate, extract, guard length, chunk, and describe the result.
///
/// The service holds only its limits and a shared metrics registry; every call works on its own
/// inputs, so one instance can be shared across request handlers through an `Arc`.
pub struct IngestService {
    limits: IngestLimits,
    metrics: Arc<IngestMetrics>,
}

/// Abstraction over the ingestion pipeline used by external surfaces (HTTP, CLI).
pub trait IngestApi: Send + Sync {
    /// Turn an upload into a structured extraction result.
    fn process_file(&self, upload: UploadedDocument) -> Result<ExtractionResult, IngestError>;

    /// Assemble the prompt context for a question about previously extracted chunks.
    fn build_context(&self, chunks: &[String], question: &str) -> String;

    /// Limits the pipeline enforces.
    fn limits(&self) -> &IngestLimits;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl IngestService {
    /// Build a service enforcing `limits`.
    pub fn new(limits: IngestLimits) -> Self {
        Self {
            limits,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Validate, extract, truncate, and chunk an upload.
    ///
    /// Validation failures return before any parsing happens and extraction failures return
    /// before chunking; no partial result is ever produced.
    pub fn process_file(&self, upload: UploadedDocument) -> Result<ExtractionResult, IngestError> {
        let UploadedDocument {
            data,
            content_type,
            filename,
        } = upload;
        let file_size = data.len();
        tracing::info!(
            filename = %filename,
            content_type = %content_type,
            file_size,
            "Processing upload"
        );

        let file_type = validate(&data, &content_type, &filename, &self.limits).map_err(|error| {
            self.metrics.record_validation_failure();
            tracing::info!(filename = %filename, reason = %error, "Upload rejected");
            error
        })?;

        let raw_text = extract_text(&data, file_type).map_err(|error| {
            self.metrics.record_extraction_failure();
            tracing::warn!(filename = %filename, error = %error, "Text extraction failed");
            error
        })?;
        drop(data);

        let raw_len = raw_text.chars().count();
        let (extracted_text, truncated) = apply_length_guard(raw_text, self.limits.max_text_length);
        if truncated {
            tracing::debug!(
                filename = %filename,
                original_chars = raw_len,
                max_chars = self.limits.max_text_length,
                "Extracted text truncated"
            );
        }

        let chunks = chunk_text(&extracted_text, self.limits.chunk_size)?;
        let chunk_count = chunks.len();
        let word_count = extracted_text.split_whitespace().count();
        let char_count = extracted_text.chars().count();

        self.metrics
            .record_document(chunk_count as u64, file_size as u64, truncated);
        tracing::info!(
            filename = %filename,
            file_type = file_type.as_str(),
            chunks = chunk_count,
            words = word_count,
            chars = char_count,
            truncated,
            "Upload processed"
        );

        Ok(ExtractionResult {
            file_id: Uuid::new_v4(),
            filename,
            content_type,
            file_type,
            file_size,
            extracted_text,
            chunks,
            chunk_count,
            word_count,
            char_count,
            processed_at: OffsetDateTime::now_utc(),
        })
    }

    /// Return the current ingestion metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for IngestService {
    fn default() -> Self {
        Self::new(IngestLimits::default())
    }
}

impl IngestApi for IngestService {
    fn process_file(&self, upload: UploadedDocument) -> Result<ExtractionResult, IngestError> {
        IngestService::process_file(self, upload)
    }

    fn build_context(&self, chunks: &[String], question: &str) -> String {
        build_context(chunks, question)
    }

    fn limits(&self) -> &IngestLimits {
        &self.limits
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        IngestService::metrics_snapshot(self)
    }
}
