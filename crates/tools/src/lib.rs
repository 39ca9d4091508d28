//! Built-in tool implementations for TravelBot.
//!
//! Tools sit next to the chat pipeline and are invoked by the front end,
//! not by the model.

pub mod offer_lookup;

use std::path::PathBuf;
use travelbot_core::tool::ToolRegistry;

pub use offer_lookup::{OfferLookupTool, TravelOffer};

/// Create a registry with all built-in tools.
pub fn default_registry(offers_path: impl Into<PathBuf>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(OfferLookupTool::new(offers_path)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_offer_lookup() {
        let registry = default_registry("data/travel_offers.json");
        assert_eq!(registry.names(), vec!["offer_lookup"]);
    }
}
