//! TravelBot CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive support chat
//! - `ask`      — Answer a single question and exit
//! - `offer`    — Look up a travel offer by code
//! - `index`    — Build the FAQ corpus from a source file
//! - `doctor`   — Diagnose configuration, corpus and backend
//! - `status`   — Show effective settings
//! - `onboard`  — Write a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "travelbot",
    about = "TravelBot — customer-support assistant grounded in your FAQ",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question
        message: String,
    },

    /// Look up a travel offer by its code (e.g. CUB-HAV26)
    Offer {
        /// The exact offer code
        code: String,
    },

    /// Embed an FAQ source file and write the corpus files
    Index {
        /// JSON array of `{ "text": ..., "category": ... }` records
        #[arg(long)]
        faq: PathBuf,
    },

    /// Diagnose configuration, corpus and backend health
    Doctor,

    /// Show effective settings
    Status,

    /// Write a default config file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so answers on stdout stay clean.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat => commands::chat::run().await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Offer { code } => commands::offer::run(code).await?,
        Commands::Index { faq } => commands::index::run(faq).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
