//! `travelbot chat` — Interactive support chat.
//!
//! Reads lines from stdin. Besides ordinary questions it understands:
//! - `/reset` — forget the conversation and greet again
//! - `/offer CODE` — look up a travel offer
//! - `exit`, `quit`, `/exit`, `/quit`, `:q` — leave

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use travelbot_agent::Session;

use super::{CliResult, build_orchestrator, load_config, offer};

/// What one line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Reset,
    Offer(&'a str),
    Message(&'a str),
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "exit" | "quit" | "/exit" | "/quit" | ":q" => Input::Quit,
        "/reset" => Input::Reset,
        _ => match line.strip_prefix("/offer") {
            Some(code) if code.is_empty() || code.starts_with(char::is_whitespace) => {
                Input::Offer(code.trim())
            }
            _ => Input::Message(line),
        },
    }
}

pub async fn run() -> CliResult {
    let config = load_config()?;
    let orchestrator = build_orchestrator(&config)?;
    let registry = travelbot_tools::default_registry(&config.offers.data_path);
    let mut session = orchestrator.new_session();

    println!();
    print_greeting(&session);
    println!("  (type /reset to start over, /offer CODE for an offer, exit to quit)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Reset => {
                session.reset();
                debug!(session = %session.id(), "Session reset");
                print_greeting(&session);
            }
            Input::Offer(code) => {
                println!("\n{}\n", offer::lookup(&registry, code).await);
            }
            Input::Message(message) => {
                let outcome = orchestrator.handle_turn(&mut session, message).await;
                println!("\n{}: {}\n", config.assistant.name, outcome.response);
            }
        }
    }

    println!("\nGoodbye! 👋");
    Ok(())
}

fn print_greeting(session: &Session) {
    if let Some(greeting) = session.greeting() {
        println!("{greeting}\n");
    }
}

fn prompt() {
    print!("You > ");
    let _ = std::io::stdout().flush();
}
