//! Shared test helpers: scripted backends and a tiny FAQ index.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use travelbot_core::error::ProviderError;
use travelbot_core::faq::FaqEntry;
use travelbot_core::provider::{Embedder, Generation, Generator};
use travelbot_memory::FaqIndex;

/// A generator that returns a sequence of scripted results.
///
/// Each call to `invoke` returns the next result in the queue and records
/// the prompt. Panics if more calls are made than results provided.
pub struct ScriptedGenerator {
    script: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Only successful replies, in order.
    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &str) -> Result<Generation, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let call = prompts.len();
        prompts.push(prompt.to_string());

        let script = self.script.lock().unwrap();
        match script.get(call) {
            Some(Ok(text)) => Ok(Generation::text(text.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => panic!(
                "ScriptedGenerator: no more responses (call #{call}, have {})",
                script.len()
            ),
        }
    }
}

/// A generator that never answers.
pub struct HangingGenerator {
    calls: Mutex<usize>,
}

impl HangingGenerator {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Generator for HangingGenerator {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn invoke(&self, _prompt: &str) -> Result<Generation, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Generation::text("too late"))
    }
}

/// An embedder that never answers.
pub struct HangingEmbedder;

#[async_trait]
impl Embedder for HangingEmbedder {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn encode(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

const TOPICS: [&[&str]; 3] = [
    &["password", "reset", "login", "account"],
    &["refund", "payment", "price", "pay"],
    &["bag", "baggage", "luggage"],
];

/// Deterministic bag-of-keywords embedder over three topics.
pub struct KeywordEmbedder {
    dimension: usize,
    calls: Mutex<usize>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(TOPICS.len())
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut vector = vec![0.0f32; self.dimension];
        for (slot, keywords) in vector.iter_mut().zip(TOPICS) {
            *slot = words
                .iter()
                .filter(|w| keywords.iter().any(|k| w.starts_with(k)))
                .count() as f32;
        }
        Ok(vector)
    }
}

/// Four FAQ entries: two account, one payments, one baggage.
pub fn sample_index() -> FaqIndex {
    let entry = |vector: [f32; 3], text: &str, category: &str| FaqEntry {
        vector: vector.to_vec(),
        text: text.into(),
        category: category.into(),
    };
    FaqIndex::new(vec![
        entry(
            [1.0, 0.0, 0.0],
            "To reset your password, use the 'Forgot password' link on the login page.",
            "account",
        ),
        entry(
            [0.8, 0.6, 0.0],
            "Account settings let you update your payment details.",
            "account",
        ),
        entry(
            [0.0, 1.0, 0.0],
            "Refunds are processed within 5 business days.",
            "payments",
        ),
        entry(
            [0.0, 0.0, 1.0],
            "Each passenger may check one 23kg bag.",
            "baggage",
        ),
    ])
    .expect("sample index is valid")
}
