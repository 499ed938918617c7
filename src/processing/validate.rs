//! Upload validation performed before any parsing.

use super::types::{FileType, IngestLimits, MAX_FILENAME_LENGTH, ValidationError};

/// Check an upload against size, type, and filename constraints.
///
/// Checks run in a fixed order (size, then MIME type, then filename) and the first failure is
/// returned. On success the normalized [`FileType`] for the declared MIME type is returned.
pub fn validate(
    data: &[u8],
    content_type: &str,
    filename: &str,
    limits: &IngestLimits,
) -> Result<FileType, ValidationError> {
    if data.len() > limits.max_file_size {
        return Err(ValidationError::FileTooLarge {
            size: data.len(),
            max: limits.max_file_size,
        });
    }

    let file_type = FileType::from_mime(content_type)
        .ok_or_else(|| ValidationError::UnsupportedType(content_type.to_string()))?;

    if filename.is_empty() || filename.chars().count() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(file_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::types::{DEFAULT_MAX_FILE_SIZE, MIME_DOCX, MIME_PDF, MIME_TXT};

    #[test]
    fn accepts_supported_uploads() {
        let limits = IngestLimits::default();
        assert_eq!(
            validate(b"test", MIME_TXT, "test.txt", &limits),
            Ok(FileType::Txt)
        );
        assert_eq!(
            validate(b"%PDF", MIME_PDF, "brief.pdf", &limits),
            Ok(FileType::Pdf)
        );
        assert_eq!(
            validate(b"PK", MIME_DOCX, "contract.docx", &limits),
            Ok(FileType::Docx)
        );
    }

    #[test]
    fn rejects_oversized_uploads_for_every_mime_type() {
        let limits = IngestLimits::default();
        let large = vec![b'x'; DEFAULT_MAX_FILE_SIZE + 1];
        for content_type in [MIME_TXT, MIME_PDF, MIME_DOCX, "image/png", ""] {
            let error = validate(&large, content_type, "large.txt", &limits).unwrap_err();
            assert!(
                matches!(error, ValidationError::FileTooLarge { .. }),
                "{content_type}: {error:?}"
            );
            assert!(error.to_string().contains("too large"));
        }
    }

    #[test]
    fn accepts_upload_exactly_at_limit() {
        let limits = IngestLimits {
            max_file_size: 16,
            ..IngestLimits::default()
        };
        assert!(validate(&[b'a'; 16], MIME_TXT, "a.txt", &limits).is_ok());
        assert!(validate(&[b'a'; 17], MIME_TXT, "a.txt", &limits).is_err());
    }

    #[test]
    fn rejects_unsupported_mime_types() {
        let limits = IngestLimits::default();
        for content_type in [
            "image/png",
            "application/msword",
            "text/markdown",
            "TEXT/PLAIN",
            "text/plain; charset=utf-8",
        ] {
            let error = validate(b"test", content_type, "test.bin", &limits).unwrap_err();
            assert_eq!(error, ValidationError::UnsupportedType(content_type.into()));
            assert!(error.to_string().contains("Unsupported file type"));
        }
    }

    #[test]
    fn rejects_empty_and_overlong_filenames() {
        let limits = IngestLimits::default();
        assert_eq!(
            validate(b"test", MIME_TXT, "", &limits),
            Err(ValidationError::InvalidFilename)
        );

        let overlong = "a".repeat(MAX_FILENAME_LENGTH + 1);
        assert_eq!(
            validate(b"test", MIME_TXT, &overlong, &limits),
            Err(ValidationError::InvalidFilename)
        );

        let at_limit = "ä".repeat(MAX_FILENAME_LENGTH);
        assert!(validate(b"test", MIME_TXT, &at_limit, &limits).is_ok());
    }

    #[test]
    fn size_is_checked_before_type() {
        let limits = IngestLimits {
            max_file_size: 1,
            ..IngestLimits::default()
        };
        let error = validate(b"too big", "image/png", "", &limits).unwrap_err();
        assert!(matches!(error, ValidationError::FileTooLarge { size: 7, max: 1 }));
    }
}
