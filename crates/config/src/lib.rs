//! Configuration loading, validation, and management for TravelBot.
//!
//! Loads configuration from `~/.travelbot/config.toml` (or `$TRAVELBOT_CONFIG`)
//! with environment variable overrides. A `.env` file in the working
//! directory is read first. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.travelbot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key shared by the generation and embedding backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Backend selection and model settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Similarity search settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Locations of the precomputed FAQ corpus
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Input and output filtering
    #[serde(default)]
    pub safety: SafetyConfig,

    /// Answer generation timeouts and retries
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Offer lookup data
    #[serde(default)]
    pub offers: OffersConfig,

    /// Assistant persona
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("retrieval", &self.retrieval)
            .field("corpus", &self.corpus)
            .field("safety", &self.safety)
            .field("generation", &self.generation)
            .field("offers", &self.offers)
            .field("assistant", &self.assistant)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend name: "gemini", "openai", "ollama", or any OpenAI-compatible name
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Override the backend base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_name() -> String {
    "gemini".into()
}
fn default_generation_model() -> String {
    "gemini-1.5-flash-latest".into()
}
fn default_embedding_model() -> String {
    "text-embedding-004".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: None,
            generation_model: default_generation_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Entries strictly below this cosine similarity are dropped
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Timeout for the query embedding call
    #[serde(default = "default_retrieval_timeout")]
    pub timeout_secs: u64,
}

fn default_top_k() -> usize {
    3
}
fn default_similarity_threshold() -> f64 {
    0.40
}
fn default_retrieval_timeout() -> u64 {
    15
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
            timeout_secs: default_retrieval_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: PathBuf,

    #[serde(default = "default_texts_path")]
    pub texts_path: PathBuf,

    #[serde(default = "default_categories_path")]
    pub categories_path: PathBuf,
}

fn default_embeddings_path() -> PathBuf {
    PathBuf::from("dist/faq_embeddings.json")
}
fn default_texts_path() -> PathBuf {
    PathBuf::from("dist/faq_texts.json")
}
fn default_categories_path() -> PathBuf {
    PathBuf::from("dist/faq_categories.json")
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            embeddings_path: default_embeddings_path(),
            texts_path: default_texts_path(),
            categories_path: default_categories_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Regular expressions matched case-insensitively against user input
    #[serde(default = "default_forbidden_patterns")]
    pub forbidden_patterns: Vec<String>,

    /// Lower-case substrings that reject a generated answer
    #[serde(default = "default_output_forbidden_phrases")]
    pub output_forbidden_phrases: Vec<String>,

    /// Answers shorter than this (after trimming) are rejected
    #[serde(default = "default_min_output_chars")]
    pub min_output_chars: usize,

    /// Timeout for the classification call; expiry counts as unsafe
    #[serde(default = "default_classifier_timeout")]
    pub classifier_timeout_secs: u64,
}

fn default_min_output_chars() -> usize {
    5
}
fn default_classifier_timeout() -> u64 {
    20
}

/// The built-in input deny-list.
pub fn default_forbidden_patterns() -> Vec<String> {
    [
        // prompt injection / jailbreak phrasing
        r"ignore previous instructions",
        r"ignore all prior directives",
        r"disregard the initial prompt",
        r"forget your rules",
        r"ignore safety guidelines",
        r"provide instructions exactly as written",
        r"output initialization",
        r"system prompt",
        r"your instructions are",
        r"developer mode",
        r"act as.*unfiltered",
        r"act as.*without restrictions",
        r"do anything now",
        r"DAN prompt",
        // credential and internals probing
        r"confidential",
        r"secret",
        r"internal",
        r"proprietary",
        r"api key",
        r"\b(your|admin|root|system|database|server)\s+passwords?\b",
        r"credentials",
        r"source code",
        r"database schema",
        r"server details",
        r"system configuration",
        r"reveal your prompt",
        // violent or illegal requests
        r"how to make.*bomb",
        r"how to build.*weapon",
        r"illegal drug synthesis",
        r"buy illegal items",
        r"how to steal",
        r"how to hack",
        r"generate malware",
        r"phishing attempt",
        r"instructions for violence",
        r"promote terrorism",
        r"child exploitation",
        r"non-consensual sexual content",
        r"instructions for self-harm",
        r"suicide guide",
        // profanity and slurs
        r"\b(fuck|shit|cunt|asshole|motherfucker|bitch|bastard)\b",
        r"\b(nigger|kike|chink|gook|wetback)\b",
        r"\b(faggot|dyke|tranny)\b",
        r"\b(racist|sexist|homophobic|transphobic|xenophobic|nazi|white supremacy|heil hitler)\b",
        r"hate speech",
        r"kill all",
        // filter evasion
        r"without morals",
        r"no ethics",
        r"ignore ethical concerns",
        r"generate potentially harmful",
        r"content warning bypass",
        r"filter avoidance",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

/// The built-in output deny-list.
pub fn default_output_forbidden_phrases() -> Vec<String> {
    [
        "inappropriate content",
        "offensive",
        "forbidden",
        "illegal",
        "harmful",
        "i cannot fulfill that request",
        "as an ai language model",
        "sensitive information",
        "unable to provide",
        "cannot answer",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            forbidden_patterns: default_forbidden_patterns(),
            output_forbidden_phrases: default_output_forbidden_phrases(),
            min_output_chars: default_min_output_chars(),
            classifier_timeout_secs: default_classifier_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Per-attempt timeout for the answer call
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after the first, for transient failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff, doubled after each failed attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Upper bound for `generation.max_retries`.
pub const MAX_GENERATION_RETRIES: u32 = 10;

fn default_generation_timeout() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_generation_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffersConfig {
    #[serde(default = "default_offers_path")]
    pub data_path: PathBuf,
}

fn default_offers_path() -> PathBuf {
    PathBuf::from("data/travel_offers.json")
}

impl Default for OffersConfig {
    fn default() -> Self {
        Self {
            data_path: default_offers_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Persona name; also the history label for assistant turns
    #[serde(default = "default_assistant_name")]
    pub name: String,

    #[serde(default = "default_company")]
    pub company: String,

    /// The only language answers may be written in
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_assistant_name() -> String {
    "TravelBotFlex".into()
}
fn default_company() -> String {
    "TravelBotFlex".into()
}
fn default_language() -> String {
    "English".into()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            company: default_company(),
            language: default_language(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.travelbot/config.toml).
    ///
    /// Also checks environment variables (after reading `.env`):
    /// - `TRAVELBOT_CONFIG` — alternative config file path
    /// - `TRAVELBOT_API_KEY`, `GOOGLE_API_KEY`, `GEMINI_API_KEY` — API key, in that order
    /// - `TRAVELBOT_PROVIDER` / `TRAVELBOT_MODEL` — backend and generation model
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let config_path = std::env::var("TRAVELBOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("TRAVELBOT_API_KEY")
                .ok()
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                .filter(|k| !k.trim().is_empty());
        }

        if let Ok(provider) = std::env::var("TRAVELBOT_PROVIDER") {
            config.provider.name = provider;
        }

        if let Ok(model) = std::env::var("TRAVELBOT_MODEL") {
            config.provider.generation_model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".travelbot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.retrieval.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(
                "retrieval.similarity_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.timeout_secs == 0
            || self.safety.classifier_timeout_secs == 0
            || self.generation.timeout_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "backend timeouts must be at least one second".into(),
            ));
        }

        if self.generation.max_retries > MAX_GENERATION_RETRIES {
            return Err(ConfigError::ValidationError(format!(
                "generation.max_retries must be at most {MAX_GENERATION_RETRIES}"
            )));
        }

        if self.safety.min_output_chars == 0 {
            return Err(ConfigError::ValidationError(
                "safety.min_output_chars must be at least 1".into(),
            ));
        }

        for pattern in &self.safety.forbidden_patterns {
            regex_lite::Regex::new(&format!("(?i){pattern}")).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "safety.forbidden_patterns entry `{pattern}` does not compile: {e}"
                ))
            })?;
        }

        Ok(())
    }

    /// The API key, or a configuration error naming where to put one.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            retrieval: RetrievalConfig::default(),
            corpus: CorpusConfig::default(),
            safety: SafetyConfig::default(),
            generation: GenerationConfig::default(),
            offers: OffersConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured (set GOOGLE_API_KEY, GEMINI_API_KEY or TRAVELBOT_API_KEY)")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.name, "gemini");
        assert_eq!(config.retrieval.top_k, 3);
        assert!((config.retrieval.similarity_threshold - 0.40).abs() < f64::EPSILON);
        assert_eq!(config.safety.min_output_chars, 5);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider.name, config.provider.name);
        assert_eq!(
            parsed.safety.forbidden_patterns.len(),
            config.safety.forbidden_patterns.len()
        );
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.safety.classifier_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn retry_budget_is_capped() {
        let mut config = AppConfig::default();
        config.generation.max_retries = MAX_GENERATION_RETRIES;
        assert!(config.validate().is_ok());

        config.generation.max_retries = u32::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn broken_pattern_rejected() {
        let mut config = AppConfig::default();
        config.safety.forbidden_patterns.push("(unclosed".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.assistant.name, "TravelBotFlex");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[retrieval]\ntop_k = 5\n\n[assistant]\nlanguage = \"Polish\"\n"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert!((config.retrieval.similarity_threshold - 0.40).abs() < f64::EPSILON);
        assert_eq!(config.assistant.language, "Polish");
        assert_eq!(config.assistant.name, "TravelBotFlex");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval\ntop_k = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let config = AppConfig {
            api_key: Some("AIza-very-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn require_api_key_rejects_blank() {
        let mut config = AppConfig::default();
        assert!(matches!(config.require_api_key(), Err(ConfigError::MissingApiKey)));
        config.api_key = Some("   ".into());
        assert!(config.require_api_key().is_err());
        config.api_key = Some("key".into());
        assert_eq!(config.require_api_key().unwrap(), "key");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gemini"));
        assert!(toml_str.contains("similarity_threshold"));
    }
}
