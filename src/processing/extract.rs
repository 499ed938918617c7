//! Plain-text extraction for the supported upload formats.
//!
//! Each format has its own backend, compiled in through cargo features:
//!
//! - `pdf`: page-by-page extraction with `lopdf`. Pages without text are skipped and the rest
//!   are joined with a blank line.
//! - `pdf-fallback`: whole-document extraction with `pdf-extract`, used when the page-level
//!   pass fails or produces nothing but whitespace.
//! - `docx`: paragraph extraction with `docx-rs`; blank paragraphs are dropped and the rest are
//!   joined with a blank line.
//!
//! Plain text needs no backend: UTF-8 is tried first and Latin-1 is used when the bytes are not
//! valid UTF-8.

use super::types::{ExtractionError, FileType};

/// Separator placed between pages and paragraphs in extracted text.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Extract plain text from `data` according to `file_type`.
pub fn extract_text(data: &[u8], file_type: FileType) -> Result<String, ExtractionError> {
    match file_type {
        FileType::Pdf => extract_pdf(data),
        FileType::Docx => extract_docx(data),
        FileType::Txt => Ok(decode_plain_text(data)),
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractionError> {
    let primary = match pdf::by_pages(data) {
        Some(Ok(text)) if !text.trim().is_empty() => return Ok(text),
        other => other,
    };

    match &primary {
        Some(Ok(_)) => {
            tracing::debug!("Page-level PDF extraction found no text; trying fallback backend");
        }
        Some(Err(message)) => tracing::warn!(
            error = %message,
            "Page-level PDF extraction failed; trying fallback backend"
        ),
        None => {}
    }

    settle_pdf(primary, pdf::whole_document(data))
}

/// Pick the outcome of a PDF extraction once the page-level pass came back blank or failed.
///
/// A fallback that produced text always wins. A blank page-level result survives a failing
/// fallback, so textless PDFs succeed with whatever whitespace the pages held.
fn settle_pdf(
    primary: Option<Result<String, String>>,
    fallback: Option<Result<String, String>>,
) -> Result<String, ExtractionError> {
    match (primary, fallback) {
        (_, Some(Ok(text))) => Ok(text),
        (Some(Ok(empty)), Some(Err(message))) => {
            tracing::warn!(
                error = %message,
                "Fallback PDF extraction failed; keeping empty page-level result"
            );
            Ok(empty)
        }
        (Some(Ok(empty)), None) => Ok(empty),
        (_, Some(Err(message))) | (Some(Err(message)), None) => Err(ExtractionError::Backend {
            file_type: FileType::Pdf,
            message,
        }),
        (None, None) => Err(ExtractionError::NoBackend(FileType::Pdf)),
    }
}

#[cfg(feature = "docx")]
fn extract_docx(data: &[u8]) -> Result<String, ExtractionError> {
    use docx_rs::DocumentChild;

    let document = docx_rs::read_docx(data).map_err(|error| ExtractionError::Backend {
        file_type: FileType::Docx,
        message: error.to_string(),
    })?;

    let mut paragraphs = Vec::new();
    for child in &document.document.children {
        let DocumentChild::Paragraph(paragraph) = child else {
            continue;
        };
        let mut text = String::new();
        docx_text::collect(&paragraph.children, &mut text);
        if !text.trim().is_empty() {
            paragraphs.push(text);
        }
    }

    Ok(paragraphs.join(BLOCK_SEPARATOR))
}

/// Paragraph text as Word shows it: plain runs, hyperlink runs and tracked insertions.
#[cfg(feature = "docx")]
mod docx_text {
    use docx_rs::{InsertChild, ParagraphChild, Run, RunChild};

    pub(super) fn collect(children: &[ParagraphChild], out: &mut String) {
        for child in children {
            match child {
                ParagraphChild::Run(run) => push_run(run, out),
                ParagraphChild::Hyperlink(link) => collect(&link.children, out),
                ParagraphChild::Insert(insert) => {
                    for child in &insert.children {
                        if let InsertChild::Run(run) = child {
                            push_run(run, out);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn push_run(run: &Run, out: &mut String) {
        for child in &run.children {
            match child {
                RunChild::Text(value) => out.push_str(&value.text),
                RunChild::Tab(_) => out.push('\t'),
                _ => {}
            }
        }
    }
}

#[cfg(not(feature = "docx"))]
fn extract_docx(_data: &[u8]) -> Result<String, ExtractionError> {
    Err(ExtractionError::NoBackend(FileType::Docx))
}

/// Decode text as UTF-8, falling back to Latin-1 for anything else.
pub fn decode_plain_text(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_owned(),
        Err(error) => {
            tracing::debug!(
                valid_up_to = error.valid_up_to(),
                "Upload is not valid UTF-8; decoding as Latin-1"
            );
            data.iter().copied().map(char::from).collect()
        }
    }
}

/// PDF backends. Each returns `None` when the backend is not compiled in.
///
/// Both parsers panic on some malformed font and object tables, so every call runs under
/// [`std::panic::catch_unwind`] and a panic is reported like any other backend error.
mod pdf {
    #[cfg(feature = "pdf")]
    pub(super) fn by_pages(data: &[u8]) -> Option<Result<String, String>> {
        Some(guarded("lopdf", || extract_pages(data)))
    }

    #[cfg(feature = "pdf")]
    fn extract_pages(data: &[u8]) -> Result<String, String> {
        let document = lopdf::Document::load_mem(data).map_err(|error| error.to_string())?;
        let mut pages = Vec::new();
        for page_number in document.get_pages().keys() {
            let text = document
                .extract_text(&[*page_number])
                .map_err(|error| format!("page {page_number}: {error}"))?;
            if !text.trim().is_empty() {
                pages.push(text.trim_end().to_string());
            }
        }
        tracing::trace!(pages = pages.len(), "Extracted PDF pages");
        Ok(pages.join(super::BLOCK_SEPARATOR))
    }

    #[cfg(not(feature = "pdf"))]
    pub(super) fn by_pages(_data: &[u8]) -> Option<Result<String, String>> {
        None
    }

    #[cfg(feature = "pdf-fallback")]
    pub(super) fn whole_document(data: &[u8]) -> Option<Result<String, String>> {
        Some(guarded("pdf-extract", || {
            pdf_extract::extract_text_from_mem(data).map_err(|error| error.to_string())
        }))
    }

    #[cfg(not(feature = "pdf-fallback"))]
    pub(super) fn whole_document(_data: &[u8]) -> Option<Result<String, String>> {
        None
    }

    #[cfg(any(feature = "pdf", feature = "pdf-fallback"))]
    fn guarded<F>(backend: &str, extract: F) -> Result<String, String>
    where
        F: FnOnce() -> Result<String, String> + std::panic::UnwindSafe,
    {
        std::panic::catch_unwind(extract).unwrap_or_else(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|reason| (*reason).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(backend, %reason, "PDF backend panicked");
            Err(format!("{backend} panicked: {reason}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_decodes_utf8() {
        let text = extract_text("Avtal § 3: Hyresgästen".as_bytes(), FileType::Txt).unwrap();
        assert_eq!(text, "Avtal § 3: Hyresgästen");
    }

    #[test]
    fn plain_text_falls_back_to_latin1() {
        // "Gästen" encoded as Latin-1 is not valid UTF-8.
        let bytes = [b'G', 0xE4, b's', b't', b'e', b'n'];
        let text = extract_text(&bytes, FileType::Txt).unwrap();
        assert_eq!(text, "Gästen");
    }

    #[test]
    fn plain_text_keeps_empty_input() {
        assert_eq!(extract_text(b"", FileType::Txt).unwrap(), "");
    }

    #[cfg(any(feature = "pdf", feature = "pdf-fallback"))]
    #[test]
    fn malformed_pdf_reports_backend_error() {
        let error = extract_text(b"definitely not a pdf", FileType::Pdf).unwrap_err();
        match error {
            ExtractionError::Backend { file_type, message } => {
                assert_eq!(file_type, FileType::Pdf);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(not(any(feature = "pdf", feature = "pdf-fallback")))]
    #[test]
    fn pdf_without_backends_is_unavailable() {
        let error = extract_text(b"%PDF-1.5", FileType::Pdf).unwrap_err();
        assert_eq!(error, ExtractionError::NoBackend(FileType::Pdf));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_text_is_extracted_per_page() {
        let bytes = fixtures::pdf_with_pages(&["Hello World!", "Second page"]);
        let text = extract_text(&bytes, FileType::Pdf).unwrap();
        assert!(text.contains("Hello World!"), "{text:?}");
        assert!(text.contains("Second page"), "{text:?}");
        let first = text.find("Hello").unwrap();
        let second = text.find("Second").unwrap();
        assert!(first < second);
        assert!(text[first..second].contains(BLOCK_SEPARATOR));
    }

    #[test]
    fn fallback_text_replaces_failed_page_pass() {
        let text = settle_pdf(
            Some(Err("broken xref".into())),
            Some(Ok("Recovered text".into())),
        )
        .unwrap();
        assert_eq!(text, "Recovered text");
    }

    #[test]
    fn fallback_text_replaces_blank_page_pass() {
        let text = settle_pdf(Some(Ok("  \n".into())), Some(Ok("Scanned words".into()))).unwrap();
        assert_eq!(text, "Scanned words");
    }

    #[test]
    fn blank_page_pass_survives_failing_fallback() {
        let text = settle_pdf(Some(Ok(String::new())), Some(Err("bad font".into()))).unwrap();
        assert_eq!(text, "");
        assert_eq!(settle_pdf(Some(Ok(String::new())), None).unwrap(), "");
    }

    #[test]
    fn pdf_errors_surface_when_nothing_succeeds() {
        let error = settle_pdf(Some(Err("broken xref".into())), Some(Err("bad font".into())))
            .unwrap_err();
        assert_eq!(
            error,
            ExtractionError::Backend {
                file_type: FileType::Pdf,
                message: "bad font".into(),
            }
        );

        let error = settle_pdf(Some(Err("broken xref".into())), None).unwrap_err();
        assert_eq!(error.to_string(), "Failed to extract text from PDF: broken xref");

        assert_eq!(
            settle_pdf(None, None).unwrap_err(),
            ExtractionError::NoBackend(FileType::Pdf)
        );
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_without_text_extracts_to_blank() {
        let bytes = fixtures::pdf_with_pages(&[""]);
        let text = extract_text(&bytes, FileType::Pdf).unwrap();
        assert!(text.trim().is_empty(), "{text:?}");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn panicking_font_tables_become_backend_errors() {
        let bytes = fixtures::pdf_with_font(fixtures::type0_font_without_descendants(), &["Text"]);
        let error = extract_text(&bytes, FileType::Pdf).unwrap_err();
        assert!(
            matches!(
                error,
                ExtractionError::Backend {
                    file_type: FileType::Pdf,
                    ..
                }
            ),
            "{error:?}"
        );
    }

    #[cfg(feature = "docx")]
    #[test]
    fn docx_hyperlink_and_inserted_runs_are_kept() {
        use docx_rs::{Docx, Hyperlink, HyperlinkType, Insert, Paragraph, Run};

        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("See "))
            .add_hyperlink(
                Hyperlink::new("jb12", HyperlinkType::Anchor)
                    .add_run(Run::new().add_text("Jordabalken 12 kap")),
            )
            .add_run(Run::new().add_text(" for rules"))
            .add_insert(Insert::new(Run::new().add_text(" on notice.")));
        let mut cursor = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(paragraph)
            .build()
            .pack(&mut cursor)
            .expect("pack docx");

        let text = extract_text(&cursor.into_inner(), FileType::Docx).unwrap();
        assert_eq!(text, "See Jordabalken 12 kap for rules on notice.");
    }

    #[cfg(feature = "docx")]
    #[test]
    fn docx_paragraphs_are_joined_with_blank_lines() {
        let bytes = fixtures::docx_with_paragraphs(&["Article 1", "", "   ", "Article 2"]);
        let text = extract_text(&bytes, FileType::Docx).unwrap();
        assert_eq!(text, "Article 1\n\nArticle 2");
    }

    #[cfg(feature = "docx")]
    #[test]
    fn malformed_docx_reports_backend_error() {
        let error = extract_text(b"PK not really a zip", FileType::Docx).unwrap_err();
        assert!(matches!(
            error,
            ExtractionError::Backend {
                file_type: FileType::Docx,
                ..
            }
        ));
        assert!(error.to_string().starts_with("Failed to extract text from DOCX"));
    }

    #[cfg(not(feature = "docx"))]
    #[test]
    fn docx_without_backend_is_unavailable() {
        let error = extract_text(b"PK", FileType::Docx).unwrap_err();
        assert_eq!(error, ExtractionError::NoBackend(FileType::Docx));
    }
}
