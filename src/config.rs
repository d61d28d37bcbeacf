//! Configuration types for PDF-to-Markdown OCR conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across calls and to diff two runs to understand
//! why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::Ocr2MdError;
use crate::ocr::OcrBackend;
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the API key when none is set in the config.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use mistral_ocr2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .model("mistral-ocr-latest")
///     .url_expiry_hours(24)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// API key for the OCR provider. If None, read from `MISTRAL_API_KEY`
    /// at backend-construction time.
    pub api_key: Option<String>,

    /// Base URL of the OCR provider. Default: `https://api.mistral.ai`.
    ///
    /// Override for self-hosted gateways or record/replay proxies in tests.
    pub base_url: String,

    /// OCR model identifier. Default: `"mistral-ocr-latest"`.
    pub model: String,

    /// Request inline base64 image payloads with the OCR result. Default: true.
    ///
    /// When false the provider still reports image identifiers per page but
    /// omits the payloads, and the reassembler leaves every `![id](id)`
    /// reference untouched — useful for text-only extraction at a fraction
    /// of the response size.
    pub include_images: bool,

    /// Lifetime of the signed access URL, in hours. Default: 24.
    ///
    /// The URL only needs to outlive the OCR call that immediately follows,
    /// so even 1 hour works; 24 matches the provider's own default and
    /// leaves room for very large documents queued behind slow jobs.
    pub url_expiry_hours: u32,

    /// Per-exchange timeout for the three provider calls, in seconds.
    /// Default: 300.
    ///
    /// The OCR exchange blocks until the whole document is processed, so
    /// this must cover the provider's full processing time, not a single
    /// round-trip. Five minutes covers multi-hundred-page documents.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Apply deterministic Markdown cleanup rules to the combined output.
    /// Default: false.
    ///
    /// Off by default so the output is byte-for-byte what the provider
    /// returned, images substituted and pages joined — nothing else.
    pub clean_markdown: bool,

    /// Pre-constructed OCR backend. Takes precedence over `api_key` /
    /// `base_url`; this is the seam for exercising the pipeline against a
    /// stub implementation in tests.
    pub backend: Option<Arc<dyn OcrBackend>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: crate::ocr::mistral::DEFAULT_BASE_URL.to_string(),
            model: "mistral-ocr-latest".to_string(),
            include_images: true,
            url_expiry_hours: 24,
            api_timeout_secs: 300,
            download_timeout_secs: 120,
            clean_markdown: false,
            backend: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("include_images", &self.include_images)
            .field("url_expiry_hours", &self.url_expiry_hours)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("clean_markdown", &self.clean_markdown)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn OcrBackend>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn include_images(mut self, v: bool) -> Self {
        self.config.include_images = v;
        self
    }

    pub fn url_expiry_hours(mut self, hours: u32) -> Self {
        self.config.url_expiry_hours = hours.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn clean_markdown(mut self, v: bool) -> Self {
        self.config.clean_markdown = v;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn OcrBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Ocr2MdError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(Ocr2MdError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if c.base_url.trim().is_empty() {
            return Err(Ocr2MdError::InvalidConfig(
                "Base URL must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
