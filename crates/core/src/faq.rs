//! FAQ corpus entries and retrieval matches.

use serde::{Deserialize, Serialize};

/// One precomputed FAQ snippet.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Embedding of `text`, produced by the same model used for queries
    pub vector: Vec<f32>,

    /// The snippet shown to the model as context
    pub text: String,

    /// Category label (e.g. "booking", "payments")
    pub category: String,
}

/// A FAQ entry that cleared the similarity threshold for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub text: String,
    pub category: String,

    /// Cosine similarity in [0, 1], full precision
    pub similarity: f64,
}

impl RetrievalMatch {
    /// Similarity rounded to four decimals, for display and prompt context only.
    pub fn display_similarity(&self) -> f64 {
        (self.similarity * 10_000.0).round() / 10_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_similarity_rounds_to_four_places() {
        let m = RetrievalMatch {
            text: "Refunds take 5 days".into(),
            category: "payments".into(),
            similarity: 0.623_456_7,
        };
        assert_eq!(m.display_similarity(), 0.6235);
        // full precision is untouched
        assert!(m.similarity > 0.6234567);
    }
}
