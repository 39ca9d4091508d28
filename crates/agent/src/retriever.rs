//! Retriever — user question to ranked FAQ shortlist.
//!
//! Retrieval never fails a turn: an embedding error, a timeout or a
//! dimension mismatch is logged and degrades to "no context".

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use travelbot_config::RetrievalConfig;
use travelbot_core::error::{ProviderError, RetrievalError};
use travelbot_core::faq::RetrievalMatch;
use travelbot_core::provider::Embedder;
use travelbot_memory::FaqIndex;

pub struct Retriever {
    index: Arc<FaqIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    threshold: f64,
    timeout: Duration,
}

impl Retriever {
    pub fn new(
        index: Arc<FaqIndex>,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
        threshold: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            index,
            embedder,
            top_k,
            threshold,
            timeout,
        }
    }

    pub fn from_config(
        index: Arc<FaqIndex>,
        embedder: Arc<dyn Embedder>,
        config: &RetrievalConfig,
    ) -> Self {
        Self::new(
            index,
            embedder,
            config.top_k,
            config.similarity_threshold,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn index(&self) -> &FaqIndex {
        &self.index
    }

    /// Retrieve with the configured `top_k` and threshold.
    pub async fn search(&self, query: &str) -> Vec<RetrievalMatch> {
        self.retrieve(query, self.top_k, self.threshold).await
    }

    /// Matches scoring at least `threshold`, best first, at most `top_k`.
    /// Empty on blank queries and on any failure.
    pub async fn retrieve(&self, query: &str, top_k: usize, threshold: f64) -> Vec<RetrievalMatch> {
        let started = Instant::now();
        match self.try_retrieve(query, top_k, threshold).await {
            Ok(matches) => {
                info!(
                    matches = matches.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "FAQ search complete"
                );
                matches
            }
            Err(e) => {
                warn!(
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "FAQ search failed, continuing without context"
                );
                Vec::new()
            }
        }
    }

    /// Like [`Self::retrieve`], but reports why nothing came back.
    pub async fn try_retrieve(
        &self,
        query: &str,
        top_k: usize,
        threshold: f64,
    ) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        if query.trim().is_empty() || top_k == 0 {
            debug!("Blank query or top_k = 0, skipping retrieval");
            return Ok(Vec::new());
        }

        let vector = match tokio::time::timeout(self.timeout, self.embedder.encode(query)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(RetrievalError::EmbeddingFailed(ProviderError::Timeout(
                    format!(
                        "embedding did not finish within {}ms",
                        self.timeout.as_millis()
                    ),
                )));
            }
        };

        self.index.search(&vector, top_k, threshold)
    }
}
