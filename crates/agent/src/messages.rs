//! Fixed user-facing strings.
//!
//! Block messages never name the stage that rejected the turn; the stage is
//! only visible in logs and the audit trail.

/// Shown when the pattern gate rejects the input.
pub const PATTERN_BLOCKED: &str = "Your message couldn't be processed due to potentially problematic content found by basic checks. Please rephrase.";

/// Shown when the safety classifier rejects the input, fails or times out.
pub const MODEL_BLOCKED: &str = "I cannot process this request as it might be inappropriate, harmful, or outside my capabilities. Please ask a standard travel-related question.";

/// Shown when the generation backend fails after retries.
pub const GENERATION_FAILED: &str =
    "Sorry, an error occurred while communicating with the AI assistant.";

/// Shown when the output gate rejects the generated answer.
pub const OUTPUT_REJECTED: &str = "I apologize, I seem to have generated an unexpected response. Could you please try rephrasing your question?";

/// First message of a fresh session.
pub fn welcome(persona: &str) -> String {
    format!(
        "Hi! I'm {persona}, your travel assistant.\n\n\
         I can help you find information about our offers and answer travel-related questions based on our internal knowledge.\n\
         How can I help you today? 😊"
    )
}

/// First message after the user clears the conversation.
pub fn welcome_back(persona: &str) -> String {
    format!("Hi! I'm {persona}, your travel assistant. How can I help you today? 😊")
}
