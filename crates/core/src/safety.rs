//! Safety verdicts produced by the input gates.

use serde::{Deserialize, Serialize};

/// Outcome of a safety evaluation.
///
/// `Indeterminate` covers malformed classifier output, backend errors and
/// timeouts. It is never treated as safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyVerdict {
    Safe,
    Unsafe,
    Indeterminate,
}

impl SafetyVerdict {
    /// Fail-closed reading of the verdict.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Safe)
    }
}

impl std::fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Safe => "safe",
            Self::Unsafe => "unsafe",
            Self::Indeterminate => "indeterminate",
        };
        f.write_str(label)
    }
}
