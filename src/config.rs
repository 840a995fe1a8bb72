//! Configuration for the exam evaluation service.
//!
//! Everything a request needs is captured once in [`EvaluationConfig`] and
//! handed to the [`crate::evaluate::Evaluator`] at construction. There is no
//! process-wide mutable state: tests substitute a fake completion client or
//! OCR engine through the config instead of touching environment globals.

use crate::error::EvalError;
use crate::pipeline::llm::CompletionClient;
use crate::pipeline::ocr::OcrEngine;
use std::fmt;
use std::sync::Arc;

/// Configuration for PDF exam evaluation.
///
/// Built via [`EvaluationConfig::builder()`] or using
/// [`EvaluationConfig::default()`].
///
/// # Example
/// ```rust
/// use examgrade::EvaluationConfig;
///
/// let config = EvaluationConfig::builder()
///     .allowed_origin("https://smart-education-taupe.vercel.app")
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct EvaluationConfig {
    /// Address the HTTP server binds to. Default: `0.0.0.0:8000`.
    pub bind_addr: String,

    /// The single origin allowed to call the evaluation endpoint.
    ///
    /// CORS policy: this origin may use any method and any header, with
    /// credentials. All other origins are rejected by the browser.
    pub allowed_origin: String,

    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-nano".
    /// If None, the provider's default model is used.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic").
    /// If None along with `client`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed completion client. Takes precedence over
    /// `provider_name`. This is the seam tests use to inject a fake model.
    pub client: Option<Arc<dyn CompletionClient>>,

    /// Pre-constructed OCR engine. Defaults to the tesseract subprocess
    /// backend when None.
    pub ocr: Option<Arc<dyn OcrEngine>>,

    /// Sampling temperature for the completion. Default: 0.1.
    ///
    /// Grading should be deterministic and faithful to the rubric; low
    /// temperature keeps scores stable across identical submissions.
    pub temperature: f32,

    /// Maximum tokens the model may generate per evaluation. Default: 4096.
    pub max_tokens: usize,

    /// Maximum rasterised page dimension (width or height) in pixels when the
    /// OCR fallback renders pages. Default: 2000.
    ///
    /// A safety cap: an A0-sized page rendered unconstrained could exhaust
    /// memory before tesseract ever sees it.
    pub max_rendered_pixels: u32,

    /// Tesseract language code for the OCR fallback. Default: "eng".
    pub ocr_lang: String,

    /// Download timeout for the document fetch, in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            allowed_origin: "https://smart-education-taupe.vercel.app".to_string(),
            model: None,
            provider_name: None,
            client: None,
            ocr: None,
            temperature: 0.1,
            max_tokens: 4096,
            max_rendered_pixels: 2000,
            ocr_lang: "eng".to_string(),
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for EvaluationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationConfig")
            .field("bind_addr", &self.bind_addr)
            .field("allowed_origin", &self.allowed_origin)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("client", &self.client.as_ref().map(|_| "<dyn CompletionClient>"))
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn OcrEngine>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("ocr_lang", &self.ocr_lang)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl EvaluationConfig {
    /// Create a new builder for `EvaluationConfig`.
    pub fn builder() -> EvaluationConfigBuilder {
        EvaluationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EvaluationConfig`].
#[derive(Debug)]
pub struct EvaluationConfigBuilder {
    config: EvaluationConfig,
}

impl EvaluationConfigBuilder {
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    pub fn allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.allowed_origin = origin.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr = Some(ocr);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn ocr_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_lang = lang.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EvaluationConfig, EvalError> {
        let c = &self.config;
        if c.allowed_origin.trim().is_empty() {
            return Err(EvalError::InvalidConfig(
                "allowed_origin must not be empty".into(),
            ));
        }
        if !c.allowed_origin.starts_with("http://") && !c.allowed_origin.starts_with("https://") {
            return Err(EvalError::InvalidConfig(format!(
                "allowed_origin must be an http(s) origin, got '{}'",
                c.allowed_origin
            )));
        }
        if c.ocr_lang.trim().is_empty() {
            return Err(EvalError::InvalidConfig("ocr_lang must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = EvaluationConfig::builder().build().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.ocr_lang, "eng");
        assert!(config.client.is_none());
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = EvaluationConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_empty_origin() {
        let err = EvaluationConfig::builder()
            .allowed_origin("")
            .build()
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_non_http_origin() {
        let err = EvaluationConfig::builder()
            .allowed_origin("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidConfig(_)));
    }

    #[test]
    fn builder_floors_rendered_pixels() {
        let config = EvaluationConfig::builder()
            .max_rendered_pixels(1)
            .build()
            .unwrap();
        assert_eq!(config.max_rendered_pixels, 100);
    }
}
