//! FAQ corpus store: three aligned JSON files.
//!
//! - embeddings: `[[f32, ...], ...]`
//! - texts: `["...", ...]`
//! - categories: `["...", ...]`
//!
//! Entry `i` is `(embeddings[i], texts[i], categories[i])`. Anything that
//! breaks that alignment is a [`DataIntegrityError`]; the corpus is never
//! partially loaded.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use travelbot_core::error::DataIntegrityError;
use travelbot_core::faq::FaqEntry;

/// Locations of the three corpus files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPaths {
    pub embeddings: PathBuf,
    pub texts: PathBuf,
    pub categories: PathBuf,
}

impl CorpusPaths {
    pub fn new(
        embeddings: impl Into<PathBuf>,
        texts: impl Into<PathBuf>,
        categories: impl Into<PathBuf>,
    ) -> Self {
        Self {
            embeddings: embeddings.into(),
            texts: texts.into(),
            categories: categories.into(),
        }
    }

    /// Paths that do not exist on disk.
    pub fn missing(&self) -> Vec<&Path> {
        [&self.embeddings, &self.texts, &self.categories]
            .into_iter()
            .map(PathBuf::as_path)
            .filter(|p| !p.exists())
            .collect()
    }
}

/// Load and validate the corpus.
pub fn load_corpus(paths: &CorpusPaths) -> Result<Vec<FaqEntry>, DataIntegrityError> {
    let vectors: Vec<Vec<f32>> = read_json(&paths.embeddings)?;
    let texts: Vec<String> = read_json(&paths.texts)?;
    let categories: Vec<String> = read_json(&paths.categories)?;

    if vectors.len() != texts.len() || texts.len() != categories.len() {
        return Err(DataIntegrityError::LengthMismatch {
            vectors: vectors.len(),
            texts: texts.len(),
            categories: categories.len(),
        });
    }

    let entries: Vec<FaqEntry> = vectors
        .into_iter()
        .zip(texts)
        .zip(categories)
        .map(|((vector, text), category)| FaqEntry {
            vector,
            text,
            category,
        })
        .collect();

    validate_entries(&entries)?;

    info!(
        entries = entries.len(),
        dimension = entries[0].vector.len(),
        "Loaded FAQ corpus"
    );
    Ok(entries)
}

/// Write entries as the three aligned corpus files.
pub fn write_corpus(paths: &CorpusPaths, entries: &[FaqEntry]) -> Result<(), DataIntegrityError> {
    validate_entries(entries)?;

    let vectors: Vec<&[f32]> = entries.iter().map(|e| e.vector.as_slice()).collect();
    let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
    let categories: Vec<&str> = entries.iter().map(|e| e.category.as_str()).collect();

    write_json(&paths.embeddings, &vectors)?;
    write_json(&paths.texts, &texts)?;
    write_json(&paths.categories, &categories)?;

    info!(entries = entries.len(), "Wrote FAQ corpus");
    Ok(())
}

/// Every vector non-empty, finite and of the same dimension; at least one entry.
pub(crate) fn validate_entries(entries: &[FaqEntry]) -> Result<(), DataIntegrityError> {
    let first = entries.first().ok_or(DataIntegrityError::EmptyCorpus)?;
    let expected = first.vector.len();

    for (index, entry) in entries.iter().enumerate() {
        let actual = entry.vector.len();
        if actual == 0 || actual != expected {
            return Err(DataIntegrityError::DimensionMismatch {
                index,
                expected,
                actual,
            });
        }
        if entry.vector.iter().any(|x| !x.is_finite()) {
            return Err(DataIntegrityError::NonFinite { index });
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataIntegrityError> {
    if !path.exists() {
        return Err(DataIntegrityError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "Reading corpus file");
    let content = std::fs::read_to_string(path).map_err(|e| DataIntegrityError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| DataIntegrityError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DataIntegrityError> {
    let unwritable = |reason: String| DataIntegrityError::Unwritable {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| unwritable(e.to_string()))?;
    }
    let json = serde_json::to_string(value).map_err(|e| unwritable(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| unwritable(e.to_string()))
}
