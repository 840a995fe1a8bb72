//! Document fetch: download the submission PDF to a scoped temp file.
//!
//! ## Why download to a temp file?
//!
//! pdfium requires a file-system path — it cannot stream from a byte buffer.
//! Downloading into a `TempDir` gives us a path pdfium can open while
//! guaranteeing cleanup on every exit path: the directory is removed when
//! [`FetchedDocument`] is dropped, whether the request succeeded, failed to
//! parse, or panicked. A failed fetch (non-2xx, network error) returns before
//! the temp directory is ever created, so nothing is left behind.

use crate::error::EvalError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// A downloaded PDF pinned to a temp directory for the life of one request.
#[derive(Debug)]
pub struct FetchedDocument {
    path: PathBuf,
    /// Kept alive to prevent cleanup until the evaluation completes.
    _temp_dir: TempDir,
}

impl FetchedDocument {
    /// Path to the downloaded PDF.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Check if the input string looks like an HTTP(S) URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Download a PDF URL into a temp directory and return the scoped handle.
///
/// Fails with [`EvalError::FetchFailed`] on network errors and non-2xx
/// statuses, and with [`EvalError::DecodeFailed`] when the downloaded bytes
/// do not start with the `%PDF` magic — catching that here gives the caller
/// a meaningful error instead of a pdfium failure one stage later.
pub async fn fetch_document(url: &str, timeout_secs: u64) -> Result<FetchedDocument, EvalError> {
    if !is_url(url) {
        return Err(EvalError::InvalidUrl {
            url: url.to_string(),
        });
    }

    info!("Fetching PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| EvalError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| EvalError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(EvalError::FetchFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| EvalError::FetchFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    debug!("Downloaded {} bytes", bytes.len());

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(EvalError::DecodeFailed {
            detail: format!(
                "downloaded content is not a PDF (first bytes: {:?})",
                &bytes[..bytes.len().min(4)]
            ),
        });
    }

    let temp_dir =
        TempDir::new().map_err(|e| EvalError::Internal(format!("tempdir: {e}")))?;
    let file_path = temp_dir.path().join("submission.pdf");

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| EvalError::Internal(format!("Failed to write temp file: {e}")))?;

    info!("Saved submission to: {}", file_path.display());

    Ok(FetchedDocument {
        path: file_path,
        _temp_dir: temp_dir,
    })
}
