//! Conversion entry points.
//!
//! The whole conversion is a single sequential chain: read the file, then
//! three blocking provider exchanges (upload, signed URL, OCR), then an
//! in-memory reassembly pass. Nothing overlaps; the input file handle is
//! released before the first network call.

use crate::config::{ConversionConfig, API_KEY_ENV};
use crate::error::Ocr2MdError;
use crate::ocr::{MistralOcr, OcrBackend};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::input::Document;
use crate::pipeline::{input, postprocess, reassemble};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file or URL to Markdown.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL to a PDF
/// * `config` — Conversion configuration
///
/// # Errors
/// Any failure aborts the whole run: missing input file, non-PDF bytes,
/// missing API key, or any error from the OCR provider (propagated with the
/// provider's own message, no retries).
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Ocr2MdError> {
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    // ── Step 1: Resolve input and read it fully ──────────────────────────
    let document = input::load_document(input_str, config.download_timeout_secs).await?;

    run_pipeline(document, config).await
}

/// Convert PDF bytes in memory to Markdown.
///
/// This avoids the need for the caller to create a file on disk when the
/// PDF data comes from a database, network stream, or in-memory buffer.
///
/// # Arguments
/// * `bytes`  — Raw PDF bytes
/// * `name`   — Display name for the document (used as the upload filename)
/// * `config` — Conversion configuration
pub async fn convert_from_bytes(
    bytes: &[u8],
    name: impl Into<String>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Ocr2MdError> {
    let document = Document {
        bytes: bytes.to_vec(),
        name: name.into(),
    };
    run_pipeline(document, config).await
}

/// Convert a PDF and write the combined Markdown directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Ocr2MdError> {
    let output = convert(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Ocr2MdError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, &output.markdown)
        .await
        .map_err(|e| Ocr2MdError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Ocr2MdError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Ocr2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Ocr2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Drive the sequential pipeline for an already-loaded document.
async fn run_pipeline(
    document: Document,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Ocr2MdError> {
    let total_start = Instant::now();
    let doc_size_bytes = document.bytes.len() as u64;

    // ── Step 2: Resolve the OCR backend ──────────────────────────────────
    let backend = resolve_backend(config)?;

    // ── Step 3: Upload and obtain a signed URL ───────────────────────────
    let upload_start = Instant::now();
    let file_id = backend.upload(&document.bytes, &document.name).await?;
    let url = backend
        .signed_url(&file_id, config.url_expiry_hours)
        .await?;
    let upload_duration_ms = upload_start.elapsed().as_millis() as u64;
    debug!("Upload + signed URL took {}ms", upload_duration_ms);

    // ── Step 4: Submit the OCR job (blocks until the result) ─────────────
    let ocr_start = Instant::now();
    let response = backend
        .process(&url, &config.model, config.include_images)
        .await?;
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;
    info!(
        "OCR complete: {} pages in {}ms",
        response.pages.len(),
        ocr_duration_ms
    );

    // ── Step 5: Reassemble ───────────────────────────────────────────────
    let ordered = response.into_ordered_pages();
    let (mut markdown, pages) = reassemble::combine_pages(&ordered);

    // ── Step 6: Optional cleanup ─────────────────────────────────────────
    if config.clean_markdown {
        markdown = postprocess::clean_markdown(&markdown);
    }

    let stats = ConversionStats {
        total_pages: pages.len(),
        images_inlined: pages.iter().map(|p| p.images_inlined).sum(),
        doc_size_bytes,
        upload_duration_ms,
        ocr_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages, {} images inlined, {}ms total",
        stats.total_pages, stats.images_inlined, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        markdown,
        pages,
        stats,
    })
}

/// Resolve the OCR backend, from most-specific to least-specific.
///
/// 1. **Pre-built backend** (`config.backend`) — the caller constructed the
///    backend entirely; we use it as-is. This is the seam for stub backends
///    in tests.
/// 2. **Configured API key** (`config.api_key`) — build a [`MistralOcr`]
///    against `config.base_url`.
/// 3. **Environment** — read the key from `MISTRAL_API_KEY`.
fn resolve_backend(config: &ConversionConfig) -> Result<Arc<dyn OcrBackend>, Ocr2MdError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    let api_key = match config.api_key.clone() {
        Some(key) if !key.is_empty() => key,
        _ => std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(Ocr2MdError::ApiKeyMissing)?,
    };

    let client = MistralOcr::with_base_url(api_key, &config.base_url, config.api_timeout_secs)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrImage, OcrPage, OcrResponse};
    use async_trait::async_trait;

    /// Stub backend returning a canned response; records nothing, retries
    /// nothing, touches no network.
    struct StubBackend {
        response: OcrResponse,
    }

    #[async_trait]
    impl OcrBackend for StubBackend {
        async fn upload(&self, _bytes: &[u8], _name: &str) -> Result<String, Ocr2MdError> {
            Ok("file-stub".to_string())
        }

        async fn signed_url(
            &self,
            file_id: &str,
            _expiry_hours: u32,
        ) -> Result<String, Ocr2MdError> {
            Ok(format!("https://stub.invalid/{file_id}"))
        }

        async fn process(
            &self,
            _url: &str,
            _model: &str,
            _include_images: bool,
        ) -> Result<OcrResponse, Ocr2MdError> {
            Ok(self.response.clone())
        }
    }

    fn stub_config(response: OcrResponse) -> ConversionConfig {
        ConversionConfig::builder()
            .backend(Arc::new(StubBackend { response }))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn bytes_pipeline_inlines_and_joins() {
        let response = OcrResponse {
            pages: vec![
                OcrPage {
                    index: 0,
                    markdown: "![img-0](img-0)\ntext".into(),
                    images: vec![OcrImage {
                        id: "img-0".into(),
                        image_base64: Some("QQ==".into()),
                    }],
                },
                OcrPage {
                    index: 1,
                    markdown: "p2".into(),
                    images: vec![],
                },
            ],
            ..Default::default()
        };

        let config = stub_config(response);
        let output = convert_from_bytes(b"%PDF-1.4 stub", "doc", &config)
            .await
            .unwrap();

        assert_eq!(output.markdown, "![img-0](QQ==)\ntext\n\np2");
        assert_eq!(output.stats.total_pages, 2);
        assert_eq!(output.stats.images_inlined, 1);
        assert_eq!(output.stats.doc_size_bytes, 13);
    }

    #[tokio::test]
    async fn out_of_order_pages_are_reordered() {
        let response = OcrResponse {
            pages: vec![
                OcrPage {
                    index: 1,
                    markdown: "second".into(),
                    images: vec![],
                },
                OcrPage {
                    index: 0,
                    markdown: "first".into(),
                    images: vec![],
                },
            ],
            ..Default::default()
        };

        let config = stub_config(response);
        let output = convert_from_bytes(b"%PDF", "doc", &config).await.unwrap();
        assert_eq!(output.markdown, "first\n\nsecond");
        assert_eq!(output.pages[0].page_num, 1);
        assert_eq!(output.pages[0].markdown, "first");
    }

    #[tokio::test]
    async fn empty_page_list_yields_empty_string() {
        let config = stub_config(OcrResponse::default());
        let output = convert_from_bytes(b"%PDF", "doc", &config).await.unwrap();
        assert_eq!(output.markdown, "");
        assert_eq!(output.stats.total_pages, 0);
    }

    #[tokio::test]
    async fn clean_markdown_is_applied_when_enabled() {
        let response = OcrResponse {
            pages: vec![OcrPage {
                index: 0,
                markdown: "line  \r\nnext".into(),
                images: vec![],
            }],
            ..Default::default()
        };

        let mut config = stub_config(response);
        config.clean_markdown = true;

        let output = convert_from_bytes(b"%PDF", "doc", &config).await.unwrap();
        assert_eq!(output.markdown, "line\nnext\n");
    }

    #[tokio::test]
    async fn convert_missing_file_fails_before_any_network() {
        let config = stub_config(OcrResponse::default());
        let err = convert("/no/such/file.pdf", &config).await;
        assert!(matches!(err, Err(Ocr2MdError::FileNotFound { .. })));
    }
}
