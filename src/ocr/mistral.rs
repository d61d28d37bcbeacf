//! Mistral implementation of the [`OcrBackend`] capability trait.
//!
//! Three endpoints, invoked strictly in sequence:
//!
//! 1. `POST /v1/files` — multipart upload with `purpose=ocr`; returns a
//!    file identifier.
//! 2. `GET /v1/files/{id}/url?expiry={hours}` — returns a time-limited
//!    signed URL for that file.
//! 3. `POST /v1/ocr` — submits the OCR job against the signed URL and
//!    blocks until the structured per-page result is available.
//!
//! No retries and no rate-limit handling: any non-success status surfaces
//! the provider's own error body verbatim and aborts the run.

use crate::error::Ocr2MdError;
use crate::ocr::{OcrBackend, OcrResponse};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Client for the Mistral files + OCR API.
pub struct MistralOcr {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

/// `POST /v1/files` response. Only the identifier matters downstream.
#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

/// `GET /v1/files/{id}/url` response.
#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

impl MistralOcr {
    /// Create a client against the default endpoint.
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, Ocr2MdError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout_secs)
    }

    /// Create a client against a custom endpoint (self-hosted gateway,
    /// record/replay proxy in tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, Ocr2MdError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Ocr2MdError::Internal(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_secs,
        })
    }

    /// Map a reqwest transport error to the crate error for `stage`.
    fn transport_error(&self, stage: &'static str, e: reqwest::Error) -> Ocr2MdError {
        if e.is_timeout() {
            Ocr2MdError::ApiTimeout {
                stage,
                secs: self.timeout_secs,
            }
        } else {
            match stage {
                "upload" => Ocr2MdError::UploadFailed {
                    detail: e.to_string(),
                },
                "signed-url" => Ocr2MdError::SignedUrlFailed {
                    file_id: String::new(),
                    detail: e.to_string(),
                },
                _ => Ocr2MdError::OcrFailed {
                    detail: e.to_string(),
                },
            }
        }
    }

    /// Turn a non-success response into [`Ocr2MdError::ApiStatus`],
    /// preserving the provider's error body.
    async fn status_error(stage: &'static str, response: reqwest::Response) -> Ocr2MdError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ocr2MdError::ApiStatus {
            stage,
            status,
            body,
        }
    }
}

#[async_trait]
impl OcrBackend for MistralOcr {
    async fn upload(&self, bytes: &[u8], name: &str) -> Result<String, Ocr2MdError> {
        info!("Uploading {} bytes as '{}'", bytes.len(), name);

        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("purpose", "ocr")
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/v1/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error("upload", e))?;

        if !response.status().is_success() {
            return Err(Self::status_error("upload", response).await);
        }

        let uploaded: UploadedFile =
            response
                .json()
                .await
                .map_err(|e| Ocr2MdError::MalformedResponse {
                    stage: "upload",
                    detail: e.to_string(),
                })?;

        debug!("Uploaded file id: {}", uploaded.id);
        Ok(uploaded.id)
    }

    async fn signed_url(&self, file_id: &str, expiry_hours: u32) -> Result<String, Ocr2MdError> {
        debug!("Requesting signed URL for '{file_id}' (expiry {expiry_hours}h)");

        let response = self
            .client
            .get(format!("{}/v1/files/{}/url", self.base_url, file_id))
            .query(&[("expiry", expiry_hours)])
            .header("Accept", "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| match self.transport_error("signed-url", e) {
                Ocr2MdError::SignedUrlFailed { detail, .. } => Ocr2MdError::SignedUrlFailed {
                    file_id: file_id.to_string(),
                    detail,
                },
                other => other,
            })?;

        if !response.status().is_success() {
            return Err(Self::status_error("signed-url", response).await);
        }

        let signed: SignedUrl =
            response
                .json()
                .await
                .map_err(|e| Ocr2MdError::MalformedResponse {
                    stage: "signed-url",
                    detail: e.to_string(),
                })?;

        Ok(signed.url)
    }

    async fn process(
        &self,
        url: &str,
        model: &str,
        include_images: bool,
    ) -> Result<OcrResponse, Ocr2MdError> {
        info!("Submitting OCR job (model: {model})");

        let body = json!({
            "model": model,
            "document": {
                "type": "document_url",
                "document_url": url,
            },
            "include_image_base64": include_images,
        });

        let response = self
            .client
            .post(format!("{}/v1/ocr", self.base_url))
            .header("Accept", "application/json")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error("ocr", e))?;

        if !response.status().is_success() {
            return Err(Self::status_error("ocr", response).await);
        }

        let ocr: OcrResponse =
            response
                .json()
                .await
                .map_err(|e| Ocr2MdError::MalformedResponse {
                    stage: "ocr",
                    detail: e.to_string(),
                })?;

        info!("OCR returned {} pages", ocr.pages.len());
        Ok(ocr)
    }
}
