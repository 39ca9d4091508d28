//! Audit logging — structured record of blocked turns.
//!
//! Rejected answers never enter conversation memory; this log is where they
//! (and every other blocked turn) are kept for review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use travelbot_core::error::TurnFailure;
use travelbot_core::message::SessionId;

/// Longest input preview kept in an entry, in characters.
const PREVIEW_CHARS: usize = 80;

/// Entries kept in memory by default; older ones are dropped first.
pub const DEFAULT_RETAINED_ENTRIES: usize = 256;

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub session_id: String,
    /// Truncated user input
    pub preview: String,
    pub outcome: AuditOutcome,
    pub details: Option<String>,
}

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// An input gate rejected the user's message
    InputBlocked { stage: String },
    /// The output gate rejected a generated answer
    OutputRejected,
    /// The generation backend failed after retries
    GenerationFailed,
}

/// Outcome of an audited turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Stopped by policy
    Denied,
    /// Stopped by a backend failure
    Failure,
}

/// Trait for audit log sinks (where events are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Audit logger that forwards every entry to its sinks and keeps the most
/// recent ones in memory.
pub struct AuditLogger {
    entries: Mutex<VecDeque<AuditEntry>>,
    retained: usize,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("entry_count", &self.count())
            .field("retained", &self.retained)
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new() -> Self {
        Self::with_sinks(Vec::new())
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            retained: DEFAULT_RETAINED_ENTRIES,
            sinks,
        }
    }

    /// Keep at most `retained` entries in memory. Sinks still see every entry.
    pub fn with_retention(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    /// Record an audit event.
    pub fn log(
        &self,
        event: AuditEvent,
        session_id: &SessionId,
        input: &str,
        outcome: AuditOutcome,
        details: Option<String>,
    ) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            session_id: session_id.to_string(),
            preview: preview(input),
            outcome,
            details,
        };

        for sink in &self.sinks {
            sink.record(&entry);
        }

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.retained {
            entries.pop_front();
        }
    }

    /// Record why a turn was blocked.
    pub fn log_turn_failure(&self, session_id: &SessionId, input: &str, failure: &TurnFailure) {
        let (event, outcome) = match failure {
            TurnFailure::PatternRejected { .. } | TurnFailure::ClassifiedUnsafe { .. } => (
                AuditEvent::InputBlocked {
                    stage: failure.stage().into(),
                },
                AuditOutcome::Denied,
            ),
            TurnFailure::ClassificationFailure(_) => (
                AuditEvent::InputBlocked {
                    stage: failure.stage().into(),
                },
                AuditOutcome::Failure,
            ),
            TurnFailure::PromptAssembly(_) | TurnFailure::GenerationFailure(_) => {
                (AuditEvent::GenerationFailed, AuditOutcome::Failure)
            }
            TurnFailure::OutputPolicyViolation { .. } => {
                (AuditEvent::OutputRejected, AuditOutcome::Denied)
            }
        };
        self.log(event, session_id, input, outcome, Some(failure.to_string()));
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Get entries filtered by outcome.
    pub fn entries_by_outcome(&self, outcome: &AuditOutcome) -> Vec<AuditEntry> {
        self.lock()
            .iter()
            .filter(|e| &e.outcome == outcome)
            .cloned()
            .collect()
    }

    /// Clear all stored entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Count of stored entries.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn preview(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}

/// A tracing-based audit sink that logs entries via `tracing::warn!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::warn!(
            event = ?entry.event,
            session = %entry.session_id,
            outcome = ?entry.outcome,
            details = ?entry.details,
            "AUDIT"
        );
        tracing::debug!(session = %entry.session_id, preview = %entry.preview, "AUDIT input");
    }
}
