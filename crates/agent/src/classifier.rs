//! Model gate — asks the generative backend to classify the user's intent.
//!
//! Fail-closed: only an exact `SAFE` answer lets a turn through. Errors and
//! timeouts are never retried.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use travelbot_core::error::{ProviderError, TurnFailure};
use travelbot_core::provider::Generator;
use travelbot_core::safety::SafetyVerdict;
use travelbot_security::parse_verdict;

use crate::prompt::PromptAssembler;

pub struct SafetyClassifier {
    generator: Arc<dyn Generator>,
    prompts: Arc<PromptAssembler>,
    timeout: Duration,
}

impl SafetyClassifier {
    pub fn new(
        generator: Arc<dyn Generator>,
        prompts: Arc<PromptAssembler>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            prompts,
            timeout,
        }
    }

    /// Classify `query`, keeping the reason for anything but `Safe`.
    pub async fn classify(&self, query: &str) -> Result<(), TurnFailure> {
        let prompt = self
            .prompts
            .classification_prompt(query)
            .map_err(|e| {
                TurnFailure::ClassificationFailure(ProviderError::NotConfigured(format!(
                    "classification prompt: {e}"
                )))
            })?;

        let response = match tokio::time::timeout(self.timeout, self.generator.invoke(&prompt)).await
        {
            Ok(Ok(generation)) => generation.content,
            Ok(Err(e)) => {
                warn!(error = %e, "Safety classification failed, treating input as unsafe");
                return Err(TurnFailure::ClassificationFailure(e));
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Safety classification timed out, treating input as unsafe"
                );
                return Err(TurnFailure::ClassificationFailure(ProviderError::Timeout(
                    format!("classifier did not answer within {}ms", self.timeout.as_millis()),
                )));
            }
        };

        let verdict = parse_verdict(&response);
        debug!(verdict = %verdict, response = %response.trim(), "Safety classification");
        if verdict.is_safe() {
            Ok(())
        } else {
            Err(TurnFailure::ClassifiedUnsafe {
                response: response.trim().to_string(),
            })
        }
    }

    /// Three-state verdict; every failure is `Indeterminate`.
    pub async fn evaluate(&self, query: &str) -> SafetyVerdict {
        match self.classify(query).await {
            Ok(()) => SafetyVerdict::Safe,
            Err(TurnFailure::ClassifiedUnsafe { response }) => parse_verdict(&response),
            Err(_) => SafetyVerdict::Indeterminate,
        }
    }

    pub async fn evaluate_prompt_safety(&self, query: &str) -> bool {
        self.evaluate(query).await.is_safe()
    }
}
