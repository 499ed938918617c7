//! HTTP surface for the ingestion pipeline.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /files` – Multipart upload (field `file`). Validates, extracts, truncates, and chunks
//!   the document, returning the full extraction record.
//! - `POST /context` – Assemble the prompt context for a question over previously returned chunks.
//! - `GET /metrics` – Observe ingestion counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//! - `GET /health` – Liveness probe.
//!
//! Uploads run on the blocking thread pool since PDF and DOCX parsing is CPU-bound.

use crate::metrics::MetricsSnapshot;
use crate::processing::{
    ExtractionResult, IngestApi, IngestError, UploadedDocument, context::sections_shown,
};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Allowance for multipart boundaries and headers on top of the file size limit.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;
/// Multipart field carrying the uploaded document.
const FILE_FIELD: &str = "file";

/// Build the HTTP router exposing the ingestion API surface.
///
/// The request body limit follows the service's file size limit, leaving room for the multipart
/// envelope, so oversized uploads still reach the validator and get its rejection reason.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: IngestApi + 'static,
{
    let body_limit = service.limits().max_file_size.saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/files", post(upload_file::<S>))
        .route("/context", post(build_context::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

/// Process a multipart upload into an extraction record.
async fn upload_file<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResult>, AppError>
where
    S: IngestApi + 'static,
{
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        upload = Some(UploadedDocument::new(data.to_vec(), content_type, filename));
        break;
    }

    let upload = upload.ok_or_else(|| {
        AppError::BadRequest(format!("multipart field '{FILE_FIELD}' is required"))
    })?;

    let result = tokio::task::spawn_blocking(move || service.process_file(upload))
        .await
        .map_err(|error| AppError::Internal(format!("upload processing aborted: {error}")))??;

    tracing::info!(
        file_id = %result.file_id,
        filename = %result.filename,
        chunks = result.chunk_count,
        "Upload request completed"
    );
    Ok(Json(result))
}

/// Request body for `POST /context`.
#[derive(Deserialize)]
struct ContextRequest {
    /// Chunks previously returned for a document.
    chunks: Vec<String>,
    /// User question appended after the document sections.
    question: String,
}

/// Response body for `POST /context`.
#[derive(Serialize)]
struct ContextResponse {
    context: String,
    sections_shown: usize,
    total_sections: usize,
}

/// Assemble the prompt context for a question.
async fn build_context<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<ContextRequest>,
) -> Json<ContextResponse>
where
    S: IngestApi,
{
    let ContextRequest { chunks, question } = request;
    let context = service.build_context(&chunks, &question);
    Json(ContextResponse {
        context,
        sections_shown: sections_shown(chunks.len()),
        total_sections: chunks.len(),
    })
}

/// Return the ingestion counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: IngestApi,
{
    Json(service.metrics_snapshot())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "app": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload_file",
                method: "POST",
                path: "/files",
                description: "Upload a PDF, DOCX, or TXT document as multipart field 'file'. Returns the extracted text, its chunks, and word/character counts.",
                request_example: None,
            },
            CommandDescriptor {
                name: "build_context",
                method: "POST",
                path: "/context",
                description: "Format document chunks and a question into a prompt context (first 5 sections only).",
                request_example: Some(json!({
                    "chunks": ["Section one text", "Section two text"],
                    "question": "What are the termination terms?"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return ingestion counters useful for observability dashboards.",
                request_example: None,
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Liveness probe.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Ingest(IngestError),
    Multipart(MultipartError),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Ingest(error) => {
                let status = match &error {
                    IngestError::Validation(_) => StatusCode::BAD_REQUEST,
                    IngestError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    IngestError::Chunking(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.to_string())
            }
            Self::Multipart(error) => (error.status(), error.body_text()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        Self::Ingest(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::Multipart(inner)
    }
}
