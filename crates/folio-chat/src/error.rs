//! Error types for the conversational core.
//!
//! `ResponseEngine::respond` and `respond_async` never return these. They
//! surface only when building a rule table or profile, from delegate
//! implementations (which the engine swallows), and from `ChatSession`.

use std::time::Duration;

use folio_core::error::FolioError;

/// Errors from the chat crate.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("a response is still pending")]
    ResponsePending,
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("delegate error: {0}")]
    Delegate(String),
    #[error("delegate timed out after {0:?}")]
    DelegateTimeout(Duration),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<FolioError> for ChatError {
    fn from(err: FolioError) -> Self {
        ChatError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Http(err.to_string())
    }
}
