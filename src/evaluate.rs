//! Top-level orchestration: URL in, parsed evaluation out.
//!
//! The [`Evaluator`] is built once at startup from an
//! [`EvaluationConfig`] — provider resolution, OCR backend selection and
//! prompt wiring all happen at construction, never per request — and is then
//! shared immutably across requests. It holds no mutable state, so concurrent
//! evaluations are safe by construction; each request owns its own temp
//! directory for the downloaded document.

use crate::config::EvaluationConfig;
use crate::error::EvalError;
use crate::output::{EvaluationOutput, EvaluationResult, EvaluationStats};
use crate::pipeline::llm::{resolve_client, CompletionClient};
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use crate::pipeline::parse::{check_score_consistency, parse_reply};
use crate::pipeline::{extract, fetch};
use crate::prompts::GRADING_PROMPT;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The exam evaluation pipeline, constructed once and shared per request.
pub struct Evaluator {
    config: EvaluationConfig,
    client: Arc<dyn CompletionClient>,
    ocr: Arc<dyn OcrEngine>,
}

impl Evaluator {
    /// Build an evaluator from the given configuration.
    ///
    /// Resolves the completion client (see
    /// [`crate::pipeline::llm::resolve_client`]) and the OCR backend here so
    /// misconfiguration fails at startup, not on the first request.
    pub fn new(config: EvaluationConfig) -> Result<Self, EvalError> {
        let client = resolve_client(&config)?;
        let ocr: Arc<dyn OcrEngine> = match config.ocr {
            Some(ref ocr) => Arc::clone(ocr),
            None => Arc::new(TesseractOcr::new(config.ocr_lang.clone())),
        };
        Ok(Self {
            config,
            client,
            ocr,
        })
    }

    /// The configuration this evaluator was built from.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate the exam submission at `pdf_url`.
    ///
    /// Control flow: fetch → text acquisition → short-circuit on empty text →
    /// completion → parse. The model is never called when extraction yields
    /// nothing, and the temp file is removed on every exit path.
    pub async fn evaluate_url(&self, pdf_url: &str) -> Result<EvaluationOutput, EvalError> {
        let total_start = Instant::now();
        info!("Starting evaluation for: {}", pdf_url);

        let fetch_start = Instant::now();
        let document = fetch::fetch_document(pdf_url, self.config.download_timeout_secs).await?;
        let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

        let extract_start = Instant::now();
        let acquired =
            extract::acquire_text(document.path(), &self.config, Arc::clone(&self.ocr)).await?;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} chars from {} pages (ocr: {})",
            acquired.text.len(),
            acquired.page_count,
            acquired.used_ocr
        );

        let llm_start = Instant::now();
        let result = self.evaluate_text(&acquired.text).await?;
        let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

        let stats = EvaluationStats {
            page_count: acquired.page_count,
            extracted_chars: acquired.text.len(),
            used_ocr: acquired.used_ocr,
            fetch_duration_ms,
            extract_duration_ms,
            llm_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        info!("Evaluation complete in {}ms", stats.total_duration_ms);

        // `document` drops here, deleting the temp directory.
        Ok(EvaluationOutput { result, stats })
    }

    /// Evaluate already-extracted submission text.
    ///
    /// Invariant: the text must be non-empty — an empty extraction
    /// short-circuits with [`EvalError::EmptyExtraction`] before any
    /// completion request is made.
    pub async fn evaluate_text(&self, extracted_text: &str) -> Result<EvaluationResult, EvalError> {
        if extracted_text.trim().is_empty() {
            return Err(EvalError::EmptyExtraction);
        }

        let reply = self.client.complete(GRADING_PROMPT, extracted_text).await?;

        let result = parse_reply(&reply);
        if !result.is_complete() {
            warn!(
                "Model reply did not match the marker contract ({} chars)",
                reply.len()
            );
            return Err(EvalError::EmptyReply);
        }

        if let Some(check) = check_score_consistency(&result) {
            if !check.consistent() {
                warn!(
                    "Per-question scores sum to {} but the model reported {}",
                    check.per_question_total, check.reported_overall
                );
            }
        }

        Ok(result)
    }
}
