#![deny(missing_docs)]

//! Document ingestion core for a legal-assistant chat backend.
//!
//! Uploaded PDF, DOCX, and plain-text files are validated, reduced to plain text, capped in
//! length, and split into bounded chunks; the chunks are later formatted together with a user
//! question into the prompt context sent to a language model.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Document processing pipeline.
pub mod processing;
