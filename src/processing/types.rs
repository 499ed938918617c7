//! Core data types and error definitions for the ingestion pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Largest upload accepted by the validator (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
/// Extracted text beyond this many characters is truncated.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 50_000;
/// Character budget per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 4_000;
/// Longest filename accepted by the validator, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// MIME type for PDF uploads.
pub const MIME_PDF: &str = "application/pdf";
/// MIME type for Office Open XML word-processing uploads.
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type for plain-text uploads.
pub const MIME_TXT: &str = "text/plain";

/// Normalized document format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// Plain text.
    Txt,
}

impl FileType {
    /// Map a declared MIME type onto a supported format. Matching is exact.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        match content_type {
            MIME_PDF => Some(Self::Pdf),
            MIME_DOCX => Some(Self::Docx),
            MIME_TXT => Some(Self::Txt),
            _ => None,
        }
    }

    /// Canonical MIME type for the format.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::Docx => MIME_DOCX,
            Self::Txt => MIME_TXT,
        }
    }

    /// Lowercase tag used in serialized results.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Txt => "TXT",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Size and length limits applied by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    /// Maximum accepted upload size in bytes.
    pub max_file_size: usize,
    /// Maximum extracted text length in characters before truncation.
    pub max_text_length: usize,
    /// Character budget per chunk.
    pub chunk_size: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Raw upload handed to the pipeline. Consumed by processing.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// File contents.
    pub data: Vec<u8>,
    /// MIME type declared by the client.
    pub content_type: String,
    /// Original filename.
    pub filename: String,
}

impl UploadedDocument {
    /// Bundle raw bytes with their declared metadata.
    pub fn new(data: Vec<u8>, content_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }
}

/// Structured record describing a processed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Identifier generated for this upload; downstream storage keys off it.
    pub file_id: Uuid,
    /// Original filename.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Normalized format tag.
    pub file_type: FileType,
    /// Upload size in bytes.
    pub file_size: usize,
    /// Extracted text after the length guard.
    pub extracted_text: String,
    /// Ordered chunks of `extracted_text`.
    pub chunks: Vec<String>,
    /// Number of chunks.
    pub chunk_count: usize,
    /// Whitespace-separated word count of `extracted_text`.
    pub word_count: usize,
    /// Character count of `extracted_text`.
    pub char_count: usize,
    /// UTC processing time, RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    pub processed_at: OffsetDateTime,
}

/// Reasons an upload is rejected before extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Upload exceeds the configured size limit.
    #[error("File too large. Maximum size is {}", megabytes(.max))]
    FileTooLarge {
        /// Upload size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max: usize,
    },
    /// Declared MIME type is not one of the supported formats.
    #[error("Unsupported file type. Supported: PDF, DOCX, TXT")]
    UnsupportedType(String),
    /// Filename is empty or too long.
    #[error("Invalid filename")]
    InvalidFilename,
}

fn megabytes(bytes: &usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{:.1}MB", *bytes as f64 / MIB as f64)
    }
}

/// Failures raised while turning bytes into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// No extraction backend for the format was compiled in.
    #[error("no backend available for {0}")]
    NoBackend(FileType),
    /// The backend rejected the document.
    #[error("Failed to extract text from {file_type}: {message}")]
    Backend {
        /// Format being extracted.
        file_type: FileType,
        /// Message reported by the backend.
        message: String,
    },
}

/// Errors produced while splitting text into chunks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkingError {
    /// A zero character budget was requested.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted by the ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Upload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Text extraction failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Chunking failed.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
}
