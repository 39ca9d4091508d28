//! Backend router — builds the configured model backend.
//!
//! One OpenAI-compatible client serves three roles: the safety classifier
//! (single call, no retry), the answer generator (wrapped in
//! [`RetryingGenerator`]) and the embedder.

use std::sync::Arc;
use std::time::Duration;
use travelbot_config::{AppConfig, ConfigError};
use travelbot_core::provider::{Embedder, Generator};
use tracing::debug;

use crate::openai_compat::OpenAiCompatProvider;
use crate::retry::{RetryPolicy, RetryingGenerator};

/// The backends one chat session talks to.
#[derive(Clone)]
pub struct Backends {
    /// Raw generator, for the safety classifier.
    pub classifier: Arc<dyn Generator>,

    /// Generator with per-attempt timeout and transient-error retries.
    pub generator: Arc<dyn Generator>,

    /// Text embedder, for retrieval.
    pub embedder: Arc<dyn Embedder>,
}

/// Build backends from configuration.
///
/// Hosted backends need an API key; `ollama` runs without one.
pub fn build_from_config(config: &AppConfig) -> Result<Backends, ConfigError> {
    let name = config.provider.name.as_str();
    let base_url = match (&config.provider.api_url, default_base_url(name)) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => url.to_string(),
        (None, None) => {
            return Err(ConfigError::ValidationError(format!(
                "provider `{name}` has no known endpoint; set provider.api_url"
            )));
        }
    };

    let api_key = if name == "ollama" {
        config.api_key.clone().unwrap_or_else(|| "ollama".into())
    } else {
        config.require_api_key()?.to_string()
    };

    debug!(provider = %name, base_url = %base_url, "Building model backend");

    let provider = Arc::new(
        OpenAiCompatProvider::new(name, base_url, api_key)
            .with_models(
                &config.provider.generation_model,
                &config.provider.embedding_model,
            )
            .with_sampling(
                config.provider.temperature,
                Some(config.provider.max_tokens),
            ),
    );

    let policy = RetryPolicy {
        timeout: Duration::from_secs(config.generation.timeout_secs),
        max_retries: config.generation.max_retries,
        backoff: Duration::from_millis(config.generation.retry_backoff_ms),
    };

    Ok(Backends {
        classifier: provider.clone(),
        generator: Arc::new(RetryingGenerator::new(provider.clone(), policy)),
        embedder: provider,
    })
}

/// Get the default base URL for well-known backends.
pub fn default_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "gemini" | "google" => Some("https://generativelanguage.googleapis.com/v1beta/openai"),
        "openai" => Some("https://api.openai.com/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        "vllm" => Some("http://localhost:8000/v1"),
        _ => None,
    }
}
