//! The OCR provider seam.
//!
//! The hosted OCR service is an opaque collaborator: three request/response
//! exchanges whose wire format is entirely owned by the provider. This module
//! defines the minimal capability trait the rest of the crate programs
//! against, plus the response types shared by every backend. Keeping the
//! trait this narrow means the reassembly logic — the only logic worth
//! testing — can be exercised against a stub backend with no network at all.

pub mod mistral;

use crate::error::Ocr2MdError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use mistral::MistralOcr;

/// Capability interface over the hosted OCR service.
///
/// Implementations perform blocking (awaited) request/response exchanges;
/// callers invoke the three operations strictly in sequence:
/// `upload` → `signed_url` → `process`.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Upload the document bytes under a display name with an OCR purpose
    /// tag; returns the provider's file identifier.
    async fn upload(&self, bytes: &[u8], name: &str) -> Result<String, Ocr2MdError>;

    /// Request a time-limited access URL for a previously uploaded file.
    async fn signed_url(&self, file_id: &str, expiry_hours: u32) -> Result<String, Ocr2MdError>;

    /// Submit an OCR job for the document behind `url` and block until the
    /// structured result is available.
    async fn process(
        &self,
        url: &str,
        model: &str,
        include_images: bool,
    ) -> Result<OcrResponse, Ocr2MdError>;
}

/// The structured result of an OCR job: an ordered sequence of pages.
///
/// Page order equals document page order and must be preserved downstream;
/// [`OcrResponse::into_ordered_pages`] re-sorts on the provider's `index`
/// field rather than trusting response ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrPage>,

    /// Model that actually served the job, as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_info: Option<UsageInfo>,
}

impl OcrResponse {
    /// Consume the response and return its pages sorted by page index.
    pub fn into_ordered_pages(self) -> Vec<OcrPage> {
        let mut pages = self.pages;
        pages.sort_by_key(|p| p.index);
        pages
    }
}

/// One unit of the OCR result, corresponding to one input document page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrPage {
    /// Zero-based page index assigned by the provider.
    #[serde(default)]
    pub index: usize,

    /// The page content as Markdown, containing zero or more image
    /// references of the form `![id](id)`.
    #[serde(default)]
    pub markdown: String,

    #[serde(default)]
    pub images: Vec<OcrImage>,
}

/// An image embedded in a page, keyed by the identifier that also appears
/// as the literal placeholder inside the page's Markdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrImage {
    pub id: String,

    /// Base64-encoded payload. Opaque passthrough: whatever the provider
    /// sends (with or without a `data:` URI prefix) is substituted verbatim.
    /// Absent when the job was submitted with `include_images = false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

/// Billing metadata the provider attaches to the OCR result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub pages_processed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_size_bytes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_sorted_by_index() {
        let resp = OcrResponse {
            pages: vec![
                OcrPage {
                    index: 2,
                    markdown: "third".into(),
                    images: vec![],
                },
                OcrPage {
                    index: 0,
                    markdown: "first".into(),
                    images: vec![],
                },
                OcrPage {
                    index: 1,
                    markdown: "second".into(),
                    images: vec![],
                },
            ],
            ..Default::default()
        };

        let ordered = resp.into_ordered_pages();
        let texts: Vec<&str> = ordered.iter().map(|p| p.markdown.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn response_deserialises_provider_shape() {
        let json = r#"{
            "pages": [
                {
                    "index": 0,
                    "markdown": "![img-0.jpeg](img-0.jpeg)\nHello",
                    "images": [
                        { "id": "img-0.jpeg", "image_base64": "data:image/jpeg;base64,QQ==" }
                    ],
                    "dimensions": { "dpi": 200, "height": 2200, "width": 1700 }
                }
            ],
            "model": "mistral-ocr-latest",
            "usage_info": { "pages_processed": 1, "doc_size_bytes": 12345 }
        }"#;

        let resp: OcrResponse = serde_json::from_str(json).expect("valid provider response");
        assert_eq!(resp.pages.len(), 1);
        assert_eq!(resp.pages[0].images[0].id, "img-0.jpeg");
        assert_eq!(
            resp.pages[0].images[0].image_base64.as_deref(),
            Some("data:image/jpeg;base64,QQ==")
        );
        assert_eq!(resp.usage_info.unwrap().pages_processed, 1);
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        // include_image_base64=false responses carry no image_base64.
        let json = r#"{ "pages": [ { "index": 0, "markdown": "text", "images": [ { "id": "img-0" } ] } ] }"#;
        let resp: OcrResponse = serde_json::from_str(json).expect("valid");
        assert!(resp.pages[0].images[0].image_base64.is_none());
        assert!(resp.model.is_none());
    }
}
