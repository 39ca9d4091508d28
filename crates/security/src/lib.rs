//! Safety layer for TravelBot — deterministic gates and audit logging.
//!
//! Provides:
//! - **Pattern gate**: case-insensitive deny-list scan of user input
//! - **Verdict parsing**: fail-closed reading of the classifier's answer
//! - **Output gate**: forbidden-phrase and minimum-length check on answers
//! - **Audit logging**: structured record of every blocked turn
//!
//! The model gate itself (the classifier call) lives in `travelbot-agent`,
//! next to the prompts it renders.

pub mod audit;
pub mod output;
pub mod patterns;
pub mod verdict;

pub use audit::{
    AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, DEFAULT_RETAINED_ENTRIES,
    TracingSink,
};
pub use output::{OutputGate, OutputViolation};
pub use patterns::PatternGate;
pub use verdict::parse_verdict;
