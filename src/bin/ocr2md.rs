//! CLI binary for mistral-ocr2md.
//!
//! A thin shim over the library crate. The command line carries exactly one
//! optional argument — the input path — and everything else (API key, model,
//! endpoint, log level) comes from the environment, so the tool stays a
//! clean stdin-free, stdout-only filter: Markdown on stdout, logs on stderr.

use anyhow::{Context, Result};
use clap::Parser;
use mistral_ocr2md::{convert, ConversionConfig};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (stdout)
  ocr2md document.pdf

  # Default input path ("document.pdf" in the current directory)
  ocr2md

  # Convert from URL, save via shell redirection
  ocr2md https://arxiv.org/pdf/1706.03762 > attention.md

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY    API key for the OCR service (required)
  MISTRAL_OCR_MODEL  OCR model ID            (default: mistral-ocr-latest)
  MISTRAL_BASE_URL   API endpoint            (default: https://api.mistral.ai)
  OCR2MD_EXPIRY      Signed-URL lifetime, hours      (default: 24)
  OCR2MD_TIMEOUT     Per-call API timeout, seconds   (default: 300)
  OCR2MD_CLEAN       Set to 1 to apply Markdown cleanup rules
  RUST_LOG           Log filter for stderr   (default: warn)

SETUP:
  1. Set API key:     export MISTRAL_API_KEY=...
  2. Convert:         ocr2md document.pdf > output.md
"#;

/// Convert a PDF file or URL to Markdown using Mistral OCR.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2md",
    version,
    about = "Convert a PDF file or URL to Markdown using Mistral OCR",
    long_about = "Upload a PDF to the Mistral hosted OCR service and print the combined \
Markdown document — per-page OCR output with figures inlined as base64 images — to stdout.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(default_value = "document.pdf", env = "OCR2MD_INPUT")]
    input: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // stdout is reserved for the combined Markdown; everything else goes to
    // stderr at WARN unless RUST_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config from the environment ────────────────────────────────
    let config = build_config()?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&cli.input, &config)
        .await
        .context("Conversion failed")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(output.markdown.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure a trailing newline on stdout.
    if !output.markdown.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }

    Ok(())
}

/// Map environment variables to `ConversionConfig`.
fn build_config() -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder();

    if let Ok(model) = std::env::var("MISTRAL_OCR_MODEL") {
        if !model.is_empty() {
            builder = builder.model(model);
        }
    }
    if let Ok(base_url) = std::env::var("MISTRAL_BASE_URL") {
        if !base_url.is_empty() {
            builder = builder.base_url(base_url);
        }
    }
    if let Ok(expiry) = std::env::var("OCR2MD_EXPIRY") {
        let hours: u32 = expiry
            .parse()
            .with_context(|| format!("OCR2MD_EXPIRY must be a number of hours, got '{expiry}'"))?;
        builder = builder.url_expiry_hours(hours);
    }
    if let Ok(timeout) = std::env::var("OCR2MD_TIMEOUT") {
        let secs: u64 = timeout.parse().with_context(|| {
            format!("OCR2MD_TIMEOUT must be a number of seconds, got '{timeout}'")
        })?;
        builder = builder.api_timeout_secs(secs);
    }
    if let Ok(clean) = std::env::var("OCR2MD_CLEAN") {
        builder = builder.clean_markdown(clean == "1" || clean.eq_ignore_ascii_case("true"));
    }

    builder.build().context("Invalid configuration")
}
