//! Error types for the TravelBot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.
//!
//! Startup-time errors ([`Error`], [`DataIntegrityError`]) halt the process.
//! Per-turn errors never escape the orchestrator; they are folded into
//! [`TurnFailure`] for logs and the audit trail.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while wiring the pipeline at startup.
#[derive(Debug, Error)]
pub enum Error {
    // --- Prompt errors ---
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Authentication and configuration problems are permanent; timeouts,
    /// network blips, rate limits and server-side errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) | Self::RateLimited { .. } => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::ModelNotFound(_) | Self::NotConfigured(_) => {
                false
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(#[from] ProviderError),

    #[error("Query vector has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Similarity computation failed: {0}")]
    ComputationFailed(String),
}

#[derive(Debug, Error)]
pub enum DataIntegrityError {
    #[error("Corpus file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to read corpus file {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Failed to write corpus file {}: {reason}", path.display())]
    Unwritable { path: PathBuf, reason: String },

    #[error("Malformed corpus file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Corpus collections are misaligned: {vectors} vectors, {texts} texts, {categories} categories")]
    LengthMismatch {
        vectors: usize,
        texts: usize,
        categories: usize,
    },

    #[error("FAQ entry {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("FAQ entry {index} has a non-finite vector component")]
    NonFinite { index: usize },

    #[error("FAQ corpus is empty")]
    EmptyCorpus,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("Template expects {expected} parameters, got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    #[error("Template placeholder {{{0}}} is not a declared parameter")]
    UndeclaredPlaceholder(String),

    #[error("Declared parameter {0} never appears in the template")]
    UnusedParameter(String),
}

/// Why a single turn ended in the `Blocked` state.
///
/// Only ever logged and audited; user-visible text never names the stage.
#[derive(Debug, Clone, Error)]
pub enum TurnFailure {
    #[error("input matched forbidden pattern `{pattern}`")]
    PatternRejected { pattern: String },

    #[error("safety classifier judged the input unsafe (response: {response:?})")]
    ClassifiedUnsafe { response: String },

    #[error("safety classification failed: {0}")]
    ClassificationFailure(ProviderError),

    #[error("prompt assembly failed: {0}")]
    PromptAssembly(PromptError),

    #[error("generation failed: {0}")]
    GenerationFailure(ProviderError),

    #[error("output policy violation: {reason}")]
    OutputPolicyViolation { reason: String },
}

impl TurnFailure {
    /// Short, stable label for the stage that rejected the turn.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::PatternRejected { .. } => "pattern_gate",
            Self::ClassifiedUnsafe { .. } | Self::ClassificationFailure(_) => "model_gate",
            Self::PromptAssembly(_) | Self::GenerationFailure(_) => "generation",
            Self::OutputPolicyViolation { .. } => "output_gate",
        }
    }
}
