//! Conversation transcript and chat session bookkeeping.
//!
//! The engine never sees history. A [`ChatSession`] owns the transcript for
//! one widget, validates input, tracks whether a reply is in flight, and
//! appends turns. [`Transcript`] is immutable: every append returns a new
//! value and leaves the old one untouched.

use chrono::{DateTime, Local};
use folio_core::config::ChatConfig;
use folio_core::types::{DelegateMode, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::ResponseEngine;
use crate::error::ChatError;

/// Opening assistant turn of every new transcript.
pub const DEFAULT_GREETING: &str = "Hi! \u{1f44b} I'm an AI assistant trained on Mir Shafeeq's professional experience. Ask me anything about his background, skills, projects, or achievements!";

/// Assistant turn recorded when producing a reply failed.
pub const APOLOGY: &str =
    "I apologize, but I'm having trouble responding right now. Please try again!";

// =============================================================================
// ConversationTurn / Transcript
// =============================================================================

/// One message in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    /// A transcript holding only the assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![ConversationTurn::assistant(greeting)],
        }
    }

    /// A copy of this transcript with `turn` appended.
    #[must_use]
    pub fn with_turn(&self, turn: ConversationTurn) -> Self {
        let mut turns = self.turns.clone();
        turns.push(turn);
        Self { turns }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serialize the transcript as JSON, e.g. for export.
    pub fn to_json(&self) -> Result<String, ChatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// =============================================================================
// ChatSession
// =============================================================================

/// A user message accepted by [`ChatSession::begin`] and awaiting a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub message: String,
}

/// State of one chat widget: transcript, mode, and the in-flight flag.
pub struct ChatSession {
    engine: ResponseEngine,
    transcript: Transcript,
    mode: DelegateMode,
    pending: bool,
    enabled: bool,
    max_message_length: usize,
}

impl ChatSession {
    /// Create a session in pattern mode with the default greeting.
    pub fn new(engine: ResponseEngine) -> Self {
        let defaults = ChatConfig::default();
        Self {
            engine,
            transcript: Transcript::with_greeting(DEFAULT_GREETING),
            mode: defaults.mode,
            pending: false,
            enabled: defaults.enabled,
            max_message_length: defaults.max_message_length,
        }
    }

    /// Create a session using the widget settings from `config`.
    pub fn from_config(engine: ResponseEngine, config: &ChatConfig) -> Self {
        let greeting = config.greeting.as_deref().unwrap_or(DEFAULT_GREETING);
        Self {
            engine,
            transcript: Transcript::with_greeting(greeting),
            mode: config.mode,
            pending: false,
            enabled: config.enabled,
            max_message_length: config.max_message_length,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn engine(&self) -> &ResponseEngine {
        &self.engine
    }

    pub fn mode(&self) -> DelegateMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DelegateMode) {
        tracing::info!(from = %self.mode, to = %mode, "Response mode changed");
        self.mode = mode;
    }

    /// Flip between pattern and inference mode, returning the new mode.
    pub fn toggle_mode(&mut self) -> DelegateMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Accept a user message: validate it, record the user turn, and mark a
    /// reply as pending.
    pub fn begin(&mut self, input: &str) -> Result<Submission, ChatError> {
        if !self.enabled {
            return Err(ChatError::Disabled);
        }
        if self.pending {
            return Err(ChatError::ResponsePending);
        }
        if input.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if input.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        self.transcript = self.transcript.with_turn(ConversationTurn::user(input));
        self.pending = true;
        Ok(Submission {
            message: input.to_string(),
        })
    }

    /// Produce the reply for a submission according to the current mode.
    pub async fn produce(&self, submission: &Submission) -> String {
        reply_for(&self.engine, self.mode, &submission.message).await
    }

    /// Record the outcome of a pending reply and clear the pending flag.
    ///
    /// A failed outcome is recorded as the apology turn.
    pub fn finish(&mut self, reply: Result<String, ChatError>) -> &ConversationTurn {
        let content = match reply {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Reply failed, recording apology");
                APOLOGY.to_string()
            }
        };
        self.transcript = self
            .transcript
            .with_turn(ConversationTurn::assistant(content));
        self.pending = false;
        &self.transcript.turns[self.transcript.turns.len() - 1]
    }

    /// Submit a message and wait for its reply.
    ///
    /// Dropping the returned future before it completes clears the pending
    /// flag. The user turn stays in the transcript without a reply.
    pub async fn send(&mut self, input: &str) -> Result<&ConversationTurn, ChatError> {
        let submission = self.begin(input)?;
        let engine = self.engine.clone();
        let mode = self.mode;
        let reply = {
            let _pending = PendingGuard(&mut self.pending);
            reply_for(&engine, mode, &submission.message).await
        };
        Ok(self.finish(Ok(reply)))
    }
}

async fn reply_for(engine: &ResponseEngine, mode: DelegateMode, message: &str) -> String {
    match mode {
        DelegateMode::Pattern => engine.respond(message),
        DelegateMode::Inference => engine.respond_async(message).await,
    }
}

/// Clears the session's pending flag when dropped.
struct PendingGuard<'a>(&'a mut bool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

// =============================================================================
// Tests
// =============================================================================
