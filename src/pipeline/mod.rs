//! Pipeline stages for exam evaluation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different OCR backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ extract ──▶ llm ──▶ parse
//! (URL)   (pdfium/OCR) (model)  (markers)
//! ```
//!
//! 1. [`fetch`]   — download the submission URL to a scoped temp file
//! 2. [`extract`] — native text layer, falling back to rasterise + [`ocr`];
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 3. [`llm`]     — one completion call with the grading rubric; the only
//!    network I/O besides the fetch
//! 4. [`parse`]   — split the reply on the literal marker contract

pub mod extract;
pub mod fetch;
pub mod llm;
pub mod ocr;
pub mod parse;
