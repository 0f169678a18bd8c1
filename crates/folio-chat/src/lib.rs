//! Conversational core for the Folio portfolio assistant.
//!
//! Maps visitor messages to replies with an ordered keyword rule table,
//! optionally consulting a text-generation delegate first, and keeps the
//! chat widget's transcript.

pub mod delegate;
pub mod engine;
pub mod error;
pub mod inference;
pub mod profile;
pub mod rules;
pub mod suggestions;
pub mod transcript;

pub use delegate::{FnDelegate, TextDelegate};
pub use engine::ResponseEngine;
pub use error::ChatError;
pub use inference::InferenceDelegate;
pub use profile::KnowledgeProfile;
pub use rules::{portfolio_rules, ResponseRule, RuleMatch, RuleTable};
pub use suggestions::{suggestions, SUGGESTED_QUESTIONS};
pub use transcript::{ChatSession, ConversationTurn, Submission, Transcript};
