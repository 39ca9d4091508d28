//! Offer lookup tool — find a travel offer by its exact code.
//!
//! Reads a JSON array of offer records from disk on every call, so edits to
//! the offers file are picked up without a restart.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use travelbot_core::error::ToolError;
use travelbot_core::tool::{Tool, ToolResult};

const TOOL_NAME: &str = "offer_lookup";

/// One record from the offers file. Every field is optional; missing ones
/// render as `N/A`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelOffer {
    pub offer_code: Option<String>,
    pub offer_title: Option<String>,
    pub destination_country: Option<String>,
    pub duration_nights: Option<serde_json::Value>,
    #[serde(rename = "pricePerPersonUSD")]
    pub price_per_person_usd: Option<serde_json::Value>,
    pub departure_date: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub core_experiences: Vec<String>,
}

impl TravelOffer {
    /// Multi-line, display-ready description.
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("**Offer Found: {}**", or_na(&self.offer_code)),
            format!("**Title:** {}", or_na(&self.offer_title)),
            format!("**Destination:** {}", or_na(&self.destination_country)),
            format!("**Duration:** {} nights", scalar(&self.duration_nights)),
            format!(
                "**Price:** ${} USD per person",
                scalar(&self.price_per_person_usd)
            ),
            format!("**Departure:** {}", or_na(&self.departure_date)),
            format!("\n**Summary:**\n{}", or_na(&self.summary)),
        ];

        if !self.core_experiences.is_empty() {
            lines.push("\n**Core Experiences:**".into());
            lines.extend(self.core_experiences.iter().map(|e| format!("- {e}")));
        }

        lines.join("\n")
    }
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn scalar(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "N/A".into(),
        Some(other) => other.to_string(),
    }
}

/// Looks up offers in a JSON file by exact `offerCode`.
pub struct OfferLookupTool {
    data_path: PathBuf,
}

impl OfferLookupTool {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Find the offer with exactly this code (surrounding whitespace ignored).
    pub async fn find(&self, code: &str) -> Result<Option<TravelOffer>, ToolError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ToolError::InvalidArguments(
                "Please provide a valid offer code".into(),
            ));
        }

        let offers = self.load().await?;
        Ok(offers
            .into_iter()
            .find(|offer| offer.offer_code.as_deref() == Some(code)))
    }

    /// Read and parse every offer in the data file.
    pub async fn load(&self) -> Result<Vec<TravelOffer>, ToolError> {
        let path = &self.data_path;
        debug!(path = %path.display(), "Loading travel offers");

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(failure(format!(
                "Data file not found at expected location: {}",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| failure(format!("Could not read '{}': {e}", path.display())))?;

        serde_json::from_str(&content).map_err(|_| {
            failure(format!(
                "Could not decode JSON from the file '{}'. Please check its format.",
                path.display()
            ))
        })
    }
}

fn failure(reason: String) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: TOOL_NAME.into(),
        reason,
    }
}

#[async_trait]
impl Tool for OfferLookupTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Find details about a specific travel offer by its unique offer code (e.g. 'CUB-HAV26'). Input must be the exact code."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "The exact offer code"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let code = arguments["code"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'code' argument".into()))?;

        match self.find(code).await? {
            Some(offer) => {
                info!(code = %code.trim(), "Offer found");
                Ok(ToolResult {
                    success: true,
                    output: offer.describe(),
                    data: serde_json::to_value(&offer).ok(),
                })
            }
            None => {
                info!(code = %code.trim(), "Offer not found");
                Ok(ToolResult {
                    success: false,
                    output: format!(
                        "Sorry, no travel offer found with the code: '{}'.",
                        code.trim()
                    ),
                    data: None,
                })
            }
        }
    }
}
