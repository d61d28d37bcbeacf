//! Output types returned by the conversion entry points.

use serde::{Deserialize, Serialize};

/// The complete result of a conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The combined Markdown document: all pages' processed Markdown joined
    /// with exactly one blank line between consecutive pages, in page order.
    pub markdown: String,

    /// Per-page results in page order.
    pub pages: Vec<PageOutput>,

    /// Run statistics.
    pub stats: ConversionStats,
}

/// One processed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutput {
    /// 1-indexed page number.
    pub page_num: usize,

    /// The page's Markdown after image substitution.
    pub markdown: String,

    /// How many image references were replaced with inline payloads.
    pub images_inlined: usize,

    /// How many images the provider reported for this page.
    pub image_count: usize,
}

/// Statistics about a conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the OCR result.
    pub total_pages: usize,

    /// Image references replaced with inline payloads, across all pages.
    pub images_inlined: usize,

    /// Input document size in bytes.
    pub doc_size_bytes: u64,

    /// Wall-clock time of the upload + signed-URL exchanges.
    pub upload_duration_ms: u64,

    /// Wall-clock time of the OCR exchange.
    pub ocr_duration_ms: u64,

    /// Total wall-clock time of the conversion.
    pub total_duration_ms: u64,
}
