//! The chat pipeline — the heart of TravelBot.
//!
//! Each turn follows a fixed, gated sequence:
//!
//! 1. **Pattern gate**: reject known-bad phrasing before any backend call
//! 2. **Model gate**: ask the model to classify the input, fail closed
//! 3. **Retrieve**: find relevant FAQ snippets, degrade to no context
//! 4. **Generate**: render the grounded prompt and call the model
//! 5. **Output gate**: reject empty or off-policy answers
//! 6. **Commit**: append the exchange to conversation memory
//!
//! Any failure ends the turn with a fixed message and leaves memory untouched.

pub mod classifier;
pub mod messages;
pub mod orchestrator;
pub mod prompt;
pub mod retriever;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use classifier::SafetyClassifier;
pub use orchestrator::{GenerationOrchestrator, TurnOutcome, TurnState, block_message};
pub use prompt::{NO_CONTEXT, PromptAssembler, format_context};
pub use retriever::Retriever;
pub use session::Session;
