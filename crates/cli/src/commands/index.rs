//! `travelbot index` — Embed an FAQ source file into the corpus files.
//!
//! The source is a JSON array of `{ "text": ..., "category": ... }`.
//! Vectors come from the configured embedding model, so queries and corpus
//! always share one vector space.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;
use travelbot_core::faq::FaqEntry;
use travelbot_memory::write_corpus;

use super::{CliResult, corpus_paths, explain_missing_key, load_config};

/// Texts sent to the embedder per request.
const BATCH_SIZE: usize = 64;

#[derive(Debug, Deserialize)]
struct FaqRecord {
    text: String,
    #[serde(default = "default_category")]
    category: String,
}

fn default_category() -> String {
    "general".into()
}

pub async fn run(faq: PathBuf) -> CliResult {
    let config = load_config()?;

    let content = std::fs::read_to_string(&faq)
        .map_err(|e| format!("Failed to read {}: {e}", faq.display()))?;
    let records: Vec<FaqRecord> = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not a JSON array of FAQ records: {e}", faq.display()))?;
    let records: Vec<FaqRecord> = records
        .into_iter()
        .filter(|r| !r.text.trim().is_empty())
        .collect();
    if records.is_empty() {
        return Err(format!("{} contains no FAQ text", faq.display()).into());
    }

    let backends = match travelbot_providers::build_from_config(&config) {
        Ok(backends) => backends,
        Err(travelbot_config::ConfigError::MissingApiKey) => {
            explain_missing_key();
            return Err("No API key found. See above for setup instructions.".into());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "📚 Embedding {} FAQ entries with {}...",
        records.len(),
        config.provider.embedding_model
    );

    let mut entries = Vec::with_capacity(records.len());
    for chunk in records.chunks(BATCH_SIZE) {
        let texts: Vec<String> = chunk.iter().map(|r| r.text.clone()).collect();
        let vectors = backends.embedder.encode_batch(&texts).await?;
        if vectors.len() != chunk.len() {
            return Err(format!(
                "Embedder returned {} vectors for {} texts",
                vectors.len(),
                chunk.len()
            )
            .into());
        }

        entries.extend(chunk.iter().zip(vectors).map(|(record, vector)| FaqEntry {
            vector,
            text: record.text.clone(),
            category: record.category.clone(),
        }));
        info!(done = entries.len(), total = records.len(), "Embedded batch");
    }

    let paths = corpus_paths(&config);
    write_corpus(&paths, &entries)?;

    println!("✅ Wrote {} entries", entries.len());
    println!("   {}", paths.embeddings.display());
    println!("   {}", paths.texts.display());
    println!("   {}", paths.categories.display());
    Ok(())
}
