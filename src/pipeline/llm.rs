//! Completion client: hand the extracted text plus rubric to the model.
//!
//! The pipeline talks to the model through the [`CompletionClient`] trait
//! rather than a concrete provider, so tests can substitute a canned reply
//! and the grading contract can be exercised without network access. The
//! production implementation wraps an `edgequake-llm` provider, which covers
//! OpenAI, Anthropic, Gemini and friends behind one interface.
//!
//! There is deliberately no retry or backoff here: a failed completion is a
//! failed evaluation, surfaced to the caller as [`EvalError::LlmApi`].

use crate::config::EvaluationConfig;
use crate::error::EvalError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// A single-shot completion service: rubric + submission text in, reply out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit one grading request and return the model's raw reply text.
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, EvalError>;
}

/// Production client backed by an `edgequake-llm` provider.
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl ProviderClient {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for ProviderClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, EvalError> {
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_text),
        ];

        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| EvalError::LlmApi {
                message: format!("{}", e),
            })?;

        debug!(
            "Completion: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        Ok(response.content)
    }
}

/// Resolve the completion client, from most-specific to least-specific.
///
/// 1. **Pre-built client** (`config.client`) — the caller constructed the
///    client entirely; used as-is. This is the test seam.
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key from the environment.
/// 3. **Environment pair** (`EXAMGRADE_LLM_PROVIDER` + `EXAMGRADE_MODEL`) —
///    provider and model chosen at the deployment level.
/// 4. **Full auto-detection** — the factory scans known API key variables
///    and picks the first available provider.
pub fn resolve_client(config: &EvaluationConfig) -> Result<Arc<dyn CompletionClient>, EvalError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gemini-2.0-flash");
        let provider = create_provider(name, model)?;
        return Ok(Arc::new(ProviderClient::new(
            provider,
            config.temperature,
            config.max_tokens,
        )));
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EXAMGRADE_LLM_PROVIDER"),
        std::env::var("EXAMGRADE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            let provider = create_provider(&prov, &model)?;
            return Ok(Arc::new(ProviderClient::new(
                provider,
                config.temperature,
                config.max_tokens,
            )));
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| EvalError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(Arc::new(ProviderClient::new(
        provider,
        config.temperature,
        config.max_tokens,
    )))
}

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, EvalError> {
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        EvalError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}
