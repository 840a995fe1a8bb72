//! Error types for the examgrade library.
//!
//! Every failure a request can hit maps to exactly one [`EvalError`] variant,
//! so the HTTP layer can translate errors into response statuses without
//! string-matching. The taxonomy mirrors the pipeline stages:
//!
//! * `FetchFailed` — the document could not be retrieved.
//! * `DecodeFailed` — the PDF could not be opened or parsed.
//! * `EmptyExtraction` — no usable text, even after the OCR fallback.
//! * `EmptyReply` — the model's reply did not contain both required fields.
//! * `LlmApi` — the completion service itself reported an error.
//!
//! None of these are retried, and none terminate the process; the server
//! converts each into a structured `{"detail": ...}` payload.

use thiserror::Error;

/// All errors returned by the examgrade library.
#[derive(Debug, Error)]
pub enum EvalError {
    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The document URL could not be downloaded (network error or non-2xx).
    #[error("Failed to fetch '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    /// The input string is not an HTTP/HTTPS URL.
    #[error("Invalid document URL '{url}': expected http:// or https://")]
    InvalidUrl { url: String },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The downloaded bytes could not be opened as a PDF.
    #[error("Could not open the PDF: {detail}")]
    DecodeFailed { detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Neither the native text layer nor the OCR fallback produced any text.
    #[error("The PDF could not be processed: no text was extracted")]
    EmptyExtraction,

    // ── Evaluation errors ─────────────────────────────────────────────────
    /// The model reply was missing one or both marker-delimited fields.
    #[error("The model reply could not be parsed into an evaluation")]
    EmptyReply,

    /// The completion service returned an error.
    #[error("LLM API error: {message}")]
    LlmApi { message: String },

    /// No completion provider could be resolved (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
