//! Input resolution: normalise a user-supplied path or URL to document bytes.
//!
//! The provider wants the raw file bytes in a multipart upload, so unlike a
//! local rendering pipeline there is no reason to keep a file handle open:
//! the file is opened, fully read, and released before any network call.
//! URL inputs are downloaded to a `TempDir` first so the same validation
//! path (magic bytes, display name from the stem) applies to both cases and
//! cleanup happens automatically when `ResolvedInput` is dropped. We validate
//! the PDF magic bytes (`%PDF`) before uploading so callers get a meaningful
//! error rather than an opaque provider rejection.

use crate::error::Ocr2MdError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The input document, fully read into memory.
#[derive(Debug, Clone)]
pub struct Document {
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
    /// Display name derived from the file's base name without extension;
    /// used as the upload filename.
    pub name: String,
}

/// The resolved input — either a local path or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; PDF downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until the file is read.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Get the path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string and read the document into memory.
///
/// If the input is a URL, download it to a temporary directory first.
/// If the input is a local file, validate it exists and is readable.
pub async fn load_document(input: &str, timeout_secs: u64) -> Result<Document, Ocr2MdError> {
    let resolved = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        resolve_local(input)?
    };

    let path = resolved.path();
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Ocr2MdError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Ocr2MdError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    validate_magic(path, &bytes)?;

    let name = display_name(path);
    debug!("Loaded '{}': {} bytes", name, bytes.len());

    Ok(Document { bytes, name })
}

/// Derive the display name: file base name without its extension.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string())
}

/// Resolve a local file path, validating existence.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, Ocr2MdError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(Ocr2MdError::FileNotFound { path });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Reject files that do not start with the `%PDF` magic bytes.
fn validate_magic(path: &Path, bytes: &[u8]) -> Result<(), Ocr2MdError> {
    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(Ocr2MdError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Ocr2MdError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Ocr2MdError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Ocr2MdError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Ocr2MdError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Ocr2MdError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| Ocr2MdError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Ocr2MdError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Ocr2MdError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
