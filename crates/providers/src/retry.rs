//! Bounded retry with per-attempt timeouts, for the answer generation call.
//!
//! Wraps any [`Generator`]. Each attempt is cut off after `timeout`; a timeout
//! counts as a transient failure. Transient failures are retried up to
//! `max_retries` extra times with exponential backoff. Permanent failures
//! (bad key, unknown model) return immediately.
//!
//! Never wrap the safety classifier with this: an uncertain classification
//! must fail closed on the first failure.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use travelbot_core::error::ProviderError;
use travelbot_core::provider::{Generation, Generator};
use tracing::{info, warn};

/// Timeout and retry settings for one wrapped generator.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt bounded by `timeout`.
    pub fn single_attempt(timeout: Duration) -> Self {
        Self {
            timeout,
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based): backoff, 2×backoff, 4×backoff…
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// A generator that retries transient failures of an inner generator.
pub struct RetryingGenerator {
    inner: Arc<dyn Generator>,
    policy: RetryPolicy,
}

impl RetryingGenerator {
    pub fn new(inner: Arc<dyn Generator>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[async_trait]
impl Generator for RetryingGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn invoke(&self, prompt: &str) -> std::result::Result<Generation, ProviderError> {
        let attempts = self.policy.max_retries.saturating_add(1);
        let mut last_error = ProviderError::NotConfigured("No attempts made".into());

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.policy.delay_for(attempt - 1);
                info!(
                    provider = %self.inner.name(),
                    attempt,
                    total = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying generation"
                );
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(self.policy.timeout, self.inner.invoke(prompt)).await {
                Ok(Ok(generation)) => return Ok(generation),
                Ok(Err(e)) => {
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        error = %e,
                        "Generation attempt failed"
                    );
                    let transient = e.is_transient();
                    last_error = e;
                    if !transient {
                        break;
                    }
                }
                Err(_) => {
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        timeout_ms = self.policy.timeout.as_millis() as u64,
                        "Generation attempt timed out"
                    );
                    last_error = ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {}ms",
                        self.inner.name(),
                        self.policy.timeout.as_millis()
                    ));
                }
            }
        }

        Err(last_error)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        match tokio::time::timeout(self.policy.timeout, self.inner.health_check()).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }
}
