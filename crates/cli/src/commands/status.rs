//! `travelbot status` — Show effective settings.

use travelbot_config::AppConfig;

use super::{CliResult, load_config};

pub async fn run() -> CliResult {
    let config = load_config()?;

    println!("🧳 TravelBot Status");
    println!("===================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Assistant:    {} ({})", config.assistant.name, config.assistant.company);
    println!("  Language:     {}", config.assistant.language);
    println!("  Provider:     {}", config.provider.name);
    println!("  Model:        {}", config.provider.generation_model);
    println!("  Embeddings:   {}", config.provider.embedding_model);
    println!("  Temperature:  {}", config.provider.temperature);
    println!(
        "  Retrieval:    top {} at similarity >= {}",
        config.retrieval.top_k, config.retrieval.similarity_threshold
    );
    println!(
        "  Safety:       {} input patterns, {} output phrases, min {} chars",
        config.safety.forbidden_patterns.len(),
        config.safety.output_forbidden_phrases.len(),
        config.safety.min_output_chars
    );
    println!(
        "  Generation:   {}s timeout, {} retries",
        config.generation.timeout_secs, config.generation.max_retries
    );
    println!("  Corpus:       {}", config.corpus.embeddings_path.display());
    println!("  Offers:       {}", config.offers.data_path.display());
    println!(
        "  API key:      {}",
        if config.api_key.is_some() { "set" } else { "missing" }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `travelbot onboard` first");
    }

    Ok(())
}
