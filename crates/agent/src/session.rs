//! One user's chat session.
//!
//! Holds the grounding memory (committed exchanges only) and the display
//! transcript (everything the user saw, block messages included). The
//! orchestrator borrows a session mutably for the length of one turn.

use travelbot_core::message::{ConversationTurn, SessionId};
use travelbot_memory::ConversationMemory;

use crate::messages;

#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    persona: String,
    memory: ConversationMemory,
    transcript: Vec<ConversationTurn>,
}

impl Session {
    /// Fresh session, seeded with the full welcome message.
    pub fn new(persona: impl Into<String>) -> Self {
        let persona = persona.into();
        let transcript = vec![ConversationTurn::assistant(messages::welcome(&persona))];
        Self {
            id: SessionId::new(),
            persona,
            memory: ConversationMemory::new(),
            transcript,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.memory.history()
    }

    /// Everything shown to the user, oldest first.
    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// The greeting currently at the top of the transcript.
    pub fn greeting(&self) -> Option<&str> {
        self.transcript
            .first()
            .filter(|t| !t.is_user())
            .map(|t| t.content.as_str())
    }

    /// Record a committed exchange into grounding memory.
    pub(crate) fn commit(&mut self, user: &str, assistant: &str) {
        self.memory.append_exchange(user, assistant);
    }

    /// Record what the user typed and what they were shown.
    pub(crate) fn record_display(&mut self, user: &str, response: &str) {
        self.transcript.push(ConversationTurn::user(user));
        self.transcript.push(ConversationTurn::assistant(response));
    }

    /// Clear memory and transcript, then greet again.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.transcript.clear();
        self.transcript
            .push(ConversationTurn::assistant(messages::welcome_back(&self.persona)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_welcome_and_empty_memory() {
        let session = Session::new("TravelBotFlex");
        assert!(session.history().is_empty());
        assert_eq!(session.transcript().len(), 1);
        assert!(session.greeting().unwrap().starts_with("Hi! I'm TravelBotFlex"));
    }

    #[test]
    fn display_and_memory_are_separate() {
        let mut session = Session::new("TravelBotFlex");
        session.record_display("hello there", "blocked message");
        assert_eq!(session.transcript().len(), 3);
        assert!(session.history().is_empty());

        session.commit("hi", "hello!");
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn reset_clears_and_reseeds_short_welcome() {
        let mut session = Session::new("TravelBotFlex");
        let id = session.id().clone();
        session.commit("hi", "hello!");
        session.record_display("hi", "hello!");

        session.reset();
        assert!(session.memory().is_empty());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(
            session.greeting(),
            Some("Hi! I'm TravelBotFlex, your travel assistant. How can I help you today? 😊")
        );
        assert_eq!(session.id(), &id);
    }
}
