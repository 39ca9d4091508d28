//! `travelbot offer` — Look up a travel offer by code.

use travelbot_core::tool::{ToolCall, ToolRegistry};
use tracing::warn;

use super::{CliResult, load_config};

pub async fn run(code: String) -> CliResult {
    let config = load_config()?;
    let registry = travelbot_tools::default_registry(&config.offers.data_path);
    println!("{}", lookup(&registry, &code).await);
    Ok(())
}

/// Run the offer lookup and render whatever it says as display text.
pub async fn lookup(registry: &ToolRegistry, code: &str) -> String {
    let call = ToolCall {
        name: "offer_lookup".into(),
        arguments: serde_json::json!({ "code": code }),
    };

    match registry.execute(&call).await {
        Ok(result) => result.output,
        Err(e) => {
            warn!(code = %code, error = %e, "Offer lookup failed");
            e.to_string()
        }
    }
}
