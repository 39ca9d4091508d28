//! Backend traits — the abstraction over the hosted models.
//!
//! A [`Generator`] turns a fully rendered prompt into text; an [`Embedder`]
//! turns text into a vector. The pipeline never sees vendor SDK types.
//!
//! Implementations: OpenAI-compatible HTTP endpoints (Gemini, OpenAI, Ollama),
//! plus scripted mocks in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// A completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    /// The generated text
    pub content: String,

    /// Which model actually responded
    pub model: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Generation {
    /// A generation carrying only text (used by mocks and wrappers).
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: String::new(),
            usage: None,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The generative backend.
///
/// Used twice per turn: once for the safety classification prompt and once
/// for the grounded answer. Calls are awaited one at a time.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send a rendered prompt and get the complete response.
    async fn invoke(&self, prompt: &str) -> std::result::Result<Generation, ProviderError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// The embedding backend.
///
/// Assumed deterministic for a given model version, so query vectors are
/// comparable with the precomputed corpus vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Encode a single text into a vector.
    async fn encode(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError>;

    /// Encode several texts; default implementation encodes them one by one.
    async fn encode_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.encode(text).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        fn name(&self) -> &str {
            "length"
        }

        async fn encode(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn default_batch_preserves_order() {
        let embedder = LengthEmbedder;
        let vectors = embedder
            .encode_batch(&["a".into(), "abc".into()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 1.0], vec![3.0, 1.0]]);
    }

    #[test]
    fn generation_text_helper() {
        let generation = Generation::text("hello");
        assert_eq!(generation.content, "hello");
        assert!(generation.usage.is_none());
    }
}
