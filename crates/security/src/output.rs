//! Output gate — last check before an answer is shown and remembered.

use thiserror::Error;
use travelbot_config::SafetyConfig;

/// Why a generated answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputViolation {
    #[error("answer has {chars} characters after trimming, minimum is {min}")]
    TooShort { chars: usize, min: usize },

    #[error("answer contains forbidden phrase `{0}`")]
    ForbiddenPhrase(String),
}

/// Forbidden-phrase and minimum-length check on generated answers.
#[derive(Debug, Clone)]
pub struct OutputGate {
    phrases: Vec<String>,
    min_chars: usize,
}

impl OutputGate {
    pub fn new<S: AsRef<str>>(phrases: &[S], min_chars: usize) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.as_ref().to_lowercase()).collect(),
            min_chars,
        }
    }

    pub fn from_config(config: &SafetyConfig) -> Self {
        Self::new(&config.output_forbidden_phrases, config.min_output_chars)
    }

    /// Check an answer, reporting the first violation.
    pub fn check(&self, output: &str) -> Result<(), OutputViolation> {
        let chars = output.trim().chars().count();
        if chars < self.min_chars {
            return Err(OutputViolation::TooShort {
                chars,
                min: self.min_chars,
            });
        }

        let lowered = output.to_lowercase();
        match self.phrases.iter().find(|p| lowered.contains(p.as_str())) {
            Some(phrase) => Err(OutputViolation::ForbiddenPhrase(phrase.clone())),
            None => Ok(()),
        }
    }

    pub fn validate_output(&self, output: &str) -> bool {
        self.check(output).is_ok()
    }
}
