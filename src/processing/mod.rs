//! Document ingestion pipeline: validation, text extraction, chunking, and context assembly.

pub mod chunking;
pub mod context;
pub mod extract;
mod service;
pub mod types;
pub mod validate;

pub use service::{IngestApi, IngestService};
pub use types::{
    ChunkingError, ExtractionError, ExtractionResult, FileType, IngestError, IngestLimits,
    UploadedDocument, ValidationError,
};
