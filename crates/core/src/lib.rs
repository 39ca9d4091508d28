//! # TravelBot Core
//!
//! Domain types, traits, and error definitions for the TravelBot support
//! assistant. This crate has **no backend dependencies** — it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping the embedding / generation vendor via configuration
//! - Testing the whole pipeline with scripted mock backends
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod faq;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod safety;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::Error;
pub use faq::{FaqEntry, RetrievalMatch};
pub use message::{ConversationTurn, Role, SessionId};
pub use prompt::PromptTemplate;
pub use provider::{Embedder, Generation, Generator};
pub use safety::SafetyVerdict;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
