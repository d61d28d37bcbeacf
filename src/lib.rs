//! # mistral-ocr2md
//!
//! Convert PDF documents to Markdown with the Mistral hosted OCR service.
//!
//! ## Why this crate?
//!
//! Traditional PDF-to-text tools (pdftotext, pdf-extract) fail on complex
//! layouts — multi-column text, figures, and tables come out garbled or out
//! of reading order. Mistral's document OCR endpoint reads each page like a
//! human would and returns per-page Markdown with the embedded figures
//! extracted as base64 images. This crate handles the whole round trip and
//! reassembles the fragments into one self-contained Markdown document:
//! every `![id](id)` placeholder is replaced with the image's inline base64
//! payload, so the output renders with its figures and needs no side files.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file or download from URL, read bytes
//!  ├─ 2. Upload      POST the bytes to the provider's files API
//!  ├─ 3. Signed URL  request a time-limited access URL for the file
//!  ├─ 4. OCR         submit the job, block until the per-page result
//!  ├─ 5. Reassemble  inline base64 images, join pages with a blank line
//!  └─ 6. Output      combined Markdown + run stats
//! ```
//!
//! All three provider exchanges run strictly in sequence; there is no
//! concurrency, no retry policy, and no persistent state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mistral_ocr2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from MISTRAL_API_KEY
//!     let config = ConversionConfig::default();
//!     let output = convert("document.pdf", &config).await?;
//!     println!("{}", output.markdown);
//!     eprintln!("pages: {}  images inlined: {}",
//!         output.stats.total_pages,
//!         output.stats.images_inlined);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2md` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! mistral-ocr2md = { version = "0.3", default-features = false }
//! ```
//!
//! ## Testing without the network
//!
//! The provider sits behind the [`ocr::OcrBackend`] trait; pass a stub
//! implementation via [`ConversionConfig::builder()`]`.backend(..)` to
//! exercise the reassembly pipeline with canned responses.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod ocr;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, API_KEY_ENV};
pub use convert::{convert, convert_from_bytes, convert_sync, convert_to_file};
pub use error::Ocr2MdError;
pub use ocr::{MistralOcr, OcrBackend, OcrImage, OcrPage, OcrResponse};
pub use output::{ConversionOutput, ConversionStats, PageOutput};
