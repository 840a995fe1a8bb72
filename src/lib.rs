//! # examgrade
//!
//! Automated exam grading: fetch a submitted answer-sheet PDF, extract its
//! text, and have an LLM score it against a fixed rubric.
//!
//! ## Why this crate?
//!
//! Hand-grading scanned answer sheets is slow and inconsistent. This crate
//! turns a submission URL into a structured evaluation: the per-question
//! breakdown and the overall score, parsed out of the model's reply by a
//! strict marker contract so malformed replies fail loudly instead of
//! producing half-graded results.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF URL
//!  │
//!  ├─ 1. Fetch    download to a scoped temp file (deleted on every path)
//!  ├─ 2. Extract  native text layer via pdfium; if the document is image-only,
//!  │              rasterise every page and OCR it with tesseract
//!  ├─ 3. Grade    one completion call: rubric prompt + extracted text
//!  └─ 4. Parse    split the reply on ===START=== / Overall Score: /
//!                 Summary Feedback: into the two result fields
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use examgrade::{EvaluationConfig, Evaluator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = EvaluationConfig::default();
//!     let evaluator = Evaluator::new(config)?;
//!     let output = evaluator
//!         .evaluate_url("https://example.com/submission.pdf")
//!         .await?;
//!     println!("{}", output.result.evaluation_response);
//!     Ok(())
//! }
//! ```
//!
//! Or run the bundled server, which exposes the pipeline as
//! `POST /evaluate-exam`:
//!
//! ```bash
//! GEMINI_API_KEY=... examgrade-server --bind 0.0.0.0:8000
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `examgrade-server` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when embedding only the library:
//! ```toml
//! examgrade = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod evaluate;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EvaluationConfig, EvaluationConfigBuilder};
pub use error::EvalError;
pub use evaluate::Evaluator;
pub use output::{EvaluationOutput, EvaluationResult, EvaluationStats};
pub use pipeline::llm::CompletionClient;
pub use pipeline::ocr::OcrEngine;
pub use server::{build_router, serve, AppState};
