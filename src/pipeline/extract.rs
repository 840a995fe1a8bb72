//! Text acquisition: native text layer first, rasterise + OCR as fallback.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the whole acquisition (pdfium *and*
//! the tesseract subprocess) onto a dedicated blocking-pool thread so the
//! Tokio workers never stall on CPU-heavy rendering.
//!
//! ## Fallback policy
//!
//! The decision is global and binary: if *any* native text exists in the
//! document, OCR is never attempted — the fast path avoids OCR's cost and
//! noise whenever possible. Only a document with no native text at all is
//! treated as image-based and rasterised page by page. A rasterisation or
//! OCR failure discards the whole fallback's output rather than merging a
//! partial run, because a truncated per-page OCR pass would silently
//! understate the student's answers.

use crate::config::EvaluationConfig;
use crate::error::EvalError;
use crate::pipeline::ocr::OcrEngine;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The best-effort plain text of one document, plus how it was obtained.
#[derive(Debug)]
pub struct AcquiredText {
    /// Per-page text concatenated in page order. May be empty.
    pub text: String,
    /// Number of pages in the document.
    pub page_count: usize,
    /// True when the OCR fallback produced the text.
    pub used_ocr: bool,
}

/// Extract the document's text, falling back to OCR for image-based PDFs.
///
/// Fails with [`EvalError::DecodeFailed`] when the PDF cannot be opened; an
/// unreadable document never reaches the OCR stage. An empty `text` in the
/// returned value is a legitimate outcome (blank pages), reported upstream
/// as an empty extraction rather than an internal error.
pub async fn acquire_text(
    pdf_path: &Path,
    config: &EvaluationConfig,
    ocr: Arc<dyn OcrEngine>,
) -> Result<AcquiredText, EvalError> {
    let path = pdf_path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;

    tokio::task::spawn_blocking(move || acquire_text_blocking(&path, max_pixels, ocr.as_ref()))
        .await
        .map_err(|e| EvalError::Internal(format!("Extraction task panicked: {e}")))?
}

/// Blocking implementation of text acquisition.
fn acquire_text_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    ocr: &dyn OcrEngine,
) -> Result<AcquiredText, EvalError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| EvalError::DecodeFailed {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    let native = native_text(&pages);
    let (text, used_ocr) =
        resolve_document_text(native, || rasterize_pages(&pages, max_pixels), ocr);

    Ok(AcquiredText {
        text,
        page_count,
        used_ocr,
    })
}

/// Concatenate the native text layer of every page, in page order.
///
/// A page whose text accessor fails contributes nothing; the whole-document
/// yield decides whether the OCR fallback runs.
fn native_text(pages: &PdfPages) -> String {
    let mut acc = String::new();
    for page in pages.iter() {
        match page.text() {
            Ok(text) => acc.push_str(&text.all()),
            Err(e) => debug!("No text accessor for page: {:?}", e),
        }
    }
    acc
}

/// Rasterise every page into an image, capped at `max_pixels` per edge.
fn rasterize_pages(pages: &PdfPages, max_pixels: u32) -> Result<Vec<DynamicImage>, EvalError> {
    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut images = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| EvalError::Internal(format!("rasterisation failed on page {}: {:?}", idx + 1, e)))?;
        let image = bitmap.as_image();
        debug!("Rendered page {} → {}x{} px", idx + 1, image.width(), image.height());
        images.push(image);
    }
    Ok(images)
}

/// Pick the text source: native layer when any text exists, OCR otherwise.
///
/// `rasterize` is deferred so the fast path never pays for rendering.
/// Returns `(text, used_ocr)`.
fn resolve_document_text<F>(native: String, rasterize: F, ocr: &dyn OcrEngine) -> (String, bool)
where
    F: FnOnce() -> Result<Vec<DynamicImage>, EvalError>,
{
    if !native.trim().is_empty() {
        debug!("Native text layer: {} chars", native.len());
        return (native, false);
    }

    warn!("No native text layer; treating document as image-based");
    (ocr_pages(rasterize, ocr), true)
}

/// Run OCR over every rasterised page, concatenating with no separator.
///
/// Any failure — rasterisation or a single page's OCR — discards the whole
/// run and yields the empty string.
fn ocr_pages<F>(rasterize: F, ocr: &dyn OcrEngine) -> String
where
    F: FnOnce() -> Result<Vec<DynamicImage>, EvalError>,
{
    let images = match rasterize() {
        Ok(images) => images,
        Err(e) => {
            warn!("Rasterisation failed, no OCR attempted: {}", e);
            return String::new();
        }
    };

    let mut acc = String::new();
    for (idx, image) in images.iter().enumerate() {
        match ocr.recognize(image) {
            Ok(text) => acc.push_str(&text),
            Err(e) => {
                warn!("OCR failed on page {}, discarding partial text: {}", idx + 1, e);
                return String::new();
            }
        }
    }
    info!("OCR extracted {} chars from {} pages", acc.len(), images.len());
    acc
}
