//! Pipeline stages for PDF-to-Markdown OCR conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch OCR backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ upload ──▶ signed URL ──▶ OCR ──▶ reassemble ──▶ postprocess
//! (path/URL)  (files API)  (files API)  (ocr API)  (inline images)  (opt-in)
//! ```
//!
//! 1. [`input`]       — canonicalise the user-supplied path or URL, read the
//!    file fully, derive the display name
//! 2. the three provider exchanges live behind [`crate::ocr::OcrBackend`];
//!    they are the only stages with network I/O and run strictly in sequence
//! 3. [`reassemble`]  — substitute inline base64 images and join pages
//! 4. [`postprocess`] — deterministic text-cleanup rules, off by default

pub mod input;
pub mod postprocess;
pub mod reassemble;
