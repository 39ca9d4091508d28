//! In-memory FAQ embedding index.
//!
//! Brute-force cosine scan over every entry. The corpus is small and static,
//! so the index is plain data and can be shared behind an `Arc` without locks.

use std::cmp::Ordering;
use travelbot_core::error::{DataIntegrityError, RetrievalError};
use travelbot_core::faq::{FaqEntry, RetrievalMatch};

use crate::corpus::{CorpusPaths, load_corpus, validate_entries};
use crate::vector::cosine_similarity;

/// Precomputed FAQ vectors with their texts and categories.
#[derive(Debug, Clone)]
pub struct FaqIndex {
    entries: Vec<FaqEntry>,
    dimension: usize,
}

impl FaqIndex {
    /// Build an index from validated entries.
    pub fn new(entries: Vec<FaqEntry>) -> Result<Self, DataIntegrityError> {
        validate_entries(&entries)?;
        let dimension = entries[0].vector.len();
        Ok(Self { entries, dimension })
    }

    /// Load the corpus files and build the index.
    pub fn load(paths: &CorpusPaths) -> Result<Self, DataIntegrityError> {
        Self::new(load_corpus(paths)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Rank entries against a query vector.
    ///
    /// Entries scoring strictly below `threshold` are dropped before sorting.
    /// The sort is stable, so equal scores keep corpus order. Reported
    /// similarities are clamped into [0, 1] after the threshold comparison.
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
        threshold: f64,
    ) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        if query.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, &FaqEntry)> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let similarity = cosine_similarity(&entry.vector, query);
            if similarity.is_nan() {
                return Err(RetrievalError::ComputationFailed(
                    "similarity is not a number".into(),
                ));
            }
            if similarity >= threshold {
                scored.push((similarity, entry));
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(similarity, entry)| RetrievalMatch {
                text: entry.text.clone(),
                category: entry.category.clone(),
                similarity: similarity.clamp(0.0, 1.0),
            })
            .collect())
    }
}
