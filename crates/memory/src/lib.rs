//! FAQ index and conversation memory for TravelBot.

pub mod conversation;
pub mod corpus;
pub mod index;
pub mod vector;

pub use conversation::ConversationMemory;
pub use corpus::{CorpusPaths, load_corpus, write_corpus};
pub use index::FaqIndex;
pub use vector::cosine_similarity;
