//! Suggested starter questions shown under the chat input.

/// Starter questions, most useful first.
pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "What's your experience with AWS?",
    "Tell me about your recent projects",
    "What databases have you worked with?",
    "How did you improve API performance?",
    "What's your tech stack?",
    "Can you explain your event-driven architecture experience?",
];

/// How many suggestions the widget shows at once.
pub const VISIBLE_SUGGESTIONS: usize = 3;

/// The first `limit` suggestions.
pub fn suggestions(limit: usize) -> &'static [&'static str] {
    &SUGGESTED_QUESTIONS[..limit.min(SUGGESTED_QUESTIONS.len())]
}
