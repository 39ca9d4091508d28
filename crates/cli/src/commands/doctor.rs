//! `travelbot doctor` — Diagnose configuration, corpus and backend.

use travelbot_config::AppConfig;
use travelbot_memory::load_corpus;
use travelbot_security::PatternGate;

use super::{CliResult, corpus_paths};

pub async fn run() -> CliResult {
    println!("🩺 TravelBot Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file, using defaults — run `travelbot onboard`");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Cannot continue without a valid config.");
            return Ok(());
        }
    };

    match PatternGate::from_config(&config.safety) {
        Ok(gate) => println!("  ✅ {} forbidden input patterns", gate.len()),
        Err(e) => {
            println!("  ❌ Forbidden patterns: {e}");
            issues += 1;
        }
    }

    let key_needed = config.provider.name != "ollama";
    if !key_needed || config.require_api_key().is_ok() {
        println!("  ✅ API key configured");
    } else {
        println!("  ❌ No API key — set GOOGLE_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    let paths = corpus_paths(&config);
    match load_corpus(&paths) {
        Ok(entries) => println!(
            "  ✅ FAQ corpus: {} entries, {} dimensions",
            entries.len(),
            entries.first().map(|e| e.vector.len()).unwrap_or(0)
        ),
        Err(e) => {
            println!("  ❌ FAQ corpus: {e}");
            println!("     Build it with `travelbot index --faq <file>`");
            issues += 1;
        }
    }

    let offers = &config.offers.data_path;
    if offers.exists() {
        println!("  ✅ Offers file: {}", offers.display());
    } else {
        println!("  ⚠️  Offers file missing: {}", offers.display());
        issues += 1;
    }

    match travelbot_providers::build_from_config(&config) {
        Ok(backends) => match backends.classifier.health_check().await {
            Ok(true) => println!("  ✅ Backend `{}` reachable", config.provider.name),
            Ok(false) => {
                println!("  ⚠️  Backend `{}` answered but is unhealthy", config.provider.name);
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Backend `{}`: {e}", config.provider.name);
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Backend not buildable: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
