//! Subcommand implementations and the startup wiring they share.

pub mod ask;
pub mod chat;
pub mod doctor;
pub mod index;
pub mod offer;
pub mod onboard;
pub mod status;

use std::sync::Arc;
use tracing::info;
use travelbot_agent::GenerationOrchestrator;
use travelbot_config::AppConfig;
use travelbot_memory::{CorpusPaths, FaqIndex};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load configuration, with the file path in the error.
pub fn load_config() -> CliResult<AppConfig> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// Corpus file locations from configuration.
pub fn corpus_paths(config: &AppConfig) -> CorpusPaths {
    CorpusPaths::new(
        &config.corpus.embeddings_path,
        &config.corpus.texts_path,
        &config.corpus.categories_path,
    )
}

/// Print setup help for a missing API key.
pub fn explain_missing_key() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables (or put it in .env):");
    eprintln!("    GOOGLE_API_KEY    = '...'   (recommended)");
    eprintln!("    GEMINI_API_KEY    = '...'");
    eprintln!("    TRAVELBOT_API_KEY = '...'   (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}

/// Everything a chat turn needs: config, backends, the FAQ index and the
/// gated pipeline. Any failure here stops the process.
pub fn build_orchestrator(config: &AppConfig) -> CliResult<GenerationOrchestrator> {
    let backends = match travelbot_providers::build_from_config(config) {
        Ok(backends) => backends,
        Err(travelbot_config::ConfigError::MissingApiKey) => {
            explain_missing_key();
            return Err("No API key found. See above for setup instructions.".into());
        }
        Err(e) => return Err(e.into()),
    };

    let index = FaqIndex::load(&corpus_paths(config)).map_err(|e| {
        format!("Failed to load FAQ corpus: {e} (build it with `travelbot index --faq <file>`)")
    })?;
    info!(
        entries = index.len(),
        dimension = index.dimension(),
        provider = %config.provider.name,
        model = %config.provider.generation_model,
        "Pipeline ready"
    );

    Ok(GenerationOrchestrator::from_config(
        config,
        Arc::new(index),
        backends,
    )?)
}
