//! Model backends for TravelBot.
//!
//! Every backend implements the `travelbot_core::Generator` and
//! `travelbot_core::Embedder` traits. The router builds the configured
//! backend and wraps the answer path with timeouts and retries.

pub mod openai_compat;
pub mod retry;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use retry::{RetryPolicy, RetryingGenerator};
pub use router::{Backends, build_from_config};
