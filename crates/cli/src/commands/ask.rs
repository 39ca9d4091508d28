//! `travelbot ask` — Answer one question and exit.

use super::{CliResult, build_orchestrator, load_config};

pub async fn run(message: String) -> CliResult {
    let config = load_config()?;
    let orchestrator = build_orchestrator(&config)?;
    let mut session = orchestrator.new_session();

    let outcome = orchestrator.handle_turn(&mut session, &message).await;
    println!("{}", outcome.response);
    Ok(())
}
