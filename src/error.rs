//! Error types for the mistral-ocr2md library.
//!
//! One fatal error type, [`Ocr2MdError`], covers the whole pipeline. The
//! conversion is a strictly sequential chain — resolve input, upload, get a
//! signed URL, run OCR, reassemble — so the first failure aborts the run and
//! there is no page-level partial-success state to model. Variants are split
//! by which of the three provider exchanges failed, because "the upload was
//! rejected" and "the OCR job was rejected" point the user at different
//! remedies (file too large vs. model name wrong).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the mistral-ocr2md library.
#[derive(Debug, Error)]
pub enum Ocr2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Provider errors ───────────────────────────────────────────────────
    /// No API key in the config and none in the environment.
    #[error(
        "Mistral API key is not configured.\n\
         Set MISTRAL_API_KEY, or pass the key via ConversionConfig::builder().api_key(..)."
    )]
    ApiKeyMissing,

    /// The file-upload exchange failed.
    #[error("File upload to the OCR service failed: {detail}")]
    UploadFailed { detail: String },

    /// The signed-URL exchange failed.
    #[error("Could not obtain a signed URL for file '{file_id}': {detail}")]
    SignedUrlFailed { file_id: String, detail: String },

    /// The OCR job itself was rejected or errored.
    #[error("OCR processing failed: {detail}")]
    OcrFailed { detail: String },

    /// The provider returned a non-success HTTP status.
    ///
    /// `body` carries the provider's own error text verbatim; there is no
    /// retry and no taxonomy beyond surfacing what the provider said.
    #[error("OCR provider returned HTTP {status} during {stage}: {body}")]
    ApiStatus {
        stage: &'static str,
        status: u16,
        body: String,
    },

    /// The OCR API call timed out.
    #[error("OCR API call timed out after {secs}s during {stage}")]
    ApiTimeout { stage: &'static str, secs: u64 },

    /// The provider's response could not be deserialised.
    #[error("Malformed response from the OCR provider during {stage}: {detail}")]
    MalformedResponse { stage: &'static str, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_display() {
        let e = Ocr2MdError::ApiStatus {
            stage: "upload",
            status: 401,
            body: "Unauthorized".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("401"), "got: {msg}");
        assert!(msg.contains("upload"));
    }

    #[test]
    fn file_not_found_display() {
        let e = Ocr2MdError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"));
    }

    #[test]
    fn signed_url_display_carries_file_id() {
        let e = Ocr2MdError::SignedUrlFailed {
            file_id: "file-abc123".into(),
            detail: "expired".into(),
        };
        assert!(e.to_string().contains("file-abc123"));
        assert!(e.to_string().contains("expired"));
    }

    #[test]
    fn api_timeout_display() {
        let e = Ocr2MdError::ApiTimeout {
            stage: "ocr",
            secs: 120,
        };
        assert!(e.to_string().contains("120s"));
        assert!(e.to_string().contains("ocr"));
    }
}
