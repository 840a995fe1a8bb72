//! Server binary for examgrade.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `EvaluationConfig` and runs the HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use examgrade::{serve, EvaluationConfig};
use std::io;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run with provider auto-detection (scans API key env vars)
  GEMINI_API_KEY=... examgrade-server

  # Bind elsewhere and pin the model
  examgrade-server --bind 127.0.0.1:9000 --provider gemini --model gemini-2.0-flash

  # Allow a different frontend origin
  examgrade-server --origin https://staging.example.app

ENDPOINTS:
  POST /evaluate-exam   {"pdf_url": "https://..."} → {"status": "success", "data": {...}}
  GET  /health          liveness and version

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EXAMGRADE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EXAMGRADE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium

A .env file in the working directory is loaded at startup if present.

SETUP:
  1. Set API key:   export GEMINI_API_KEY=...
  2. Run:           examgrade-server --bind 0.0.0.0:8000
"#;

/// Evaluate exam-answer PDFs over HTTP using an LLM grader.
#[derive(Parser, Debug)]
#[command(
    name = "examgrade-server",
    version,
    about = "Evaluate exam-answer PDFs over HTTP using an LLM grader",
    long_about = "Serve an exam grading API: submissions arrive as PDF URLs, text is extracted \
via pdfium with a tesseract OCR fallback for scanned sheets, and an LLM scores the answers \
against a fixed rubric. Supports OpenAI, Anthropic, Google Gemini, and any \
OpenAI-compatible endpoint.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "EXAMGRADE_BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Frontend origin allowed by CORS (with credentials).
    #[arg(
        long,
        env = "EXAMGRADE_ORIGIN",
        default_value = "https://smart-education-taupe.vercel.app"
    )]
    origin: String,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-nano).
    #[arg(long, env = "EXAMGRADE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama.
    #[arg(
        long,
        env = "EXAMGRADE_LLM_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: gemini, openai, anthropic, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Sampling temperature for grading (0.0–2.0).
    #[arg(long, env = "EXAMGRADE_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per evaluation.
    #[arg(long, env = "EXAMGRADE_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Tesseract language for the OCR fallback.
    #[arg(long, env = "EXAMGRADE_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// HTTP download timeout for submissions, in seconds.
    #[arg(long, env = "EXAMGRADE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXAMGRADE_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed flags.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = EvaluationConfig::builder()
        .bind_addr(&cli.bind)
        .allowed_origin(&cli.origin)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .ocr_lang(&cli.ocr_lang)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }

    let config = builder.build().context("Invalid configuration")?;

    serve(config).await.context("Server failed")?;

    Ok(())
}
