//! Static knowledge profile describing the portfolio owner.
//!
//! The profile is only context for the text-generation delegate. The rule
//! matcher never reads it.

use std::path::Path;

use folio_core::error::{FolioError, Result};

const BUILTIN_PROFILE: &str = include_str!("../data/profile.md");
const BUILTIN_SUBJECT: &str = "Mir Shafeeq";

/// Marker that ends every delegate prompt. The inference delegate strips
/// everything up to and including it from the generated text.
pub const ANSWER_MARKER: &str = "Answer (be concise and friendly):";

/// Immutable free-text summary of the subject's background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeProfile {
    subject: String,
    text: String,
}

impl KnowledgeProfile {
    /// Create a profile. Blank text is rejected.
    pub fn new(subject: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(FolioError::Profile("profile text is empty".to_string()));
        }
        Ok(Self {
            subject: subject.into(),
            text,
        })
    }

    /// Load profile text from a file.
    pub fn from_file(subject: impl Into<String>, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Err(FolioError::Profile(format!(
                "{} contains no profile text",
                path.display()
            )));
        }
        let profile = Self::new(subject, text)?;
        tracing::info!(path = %path.display(), bytes = profile.text.len(), "Knowledge profile loaded");
        Ok(profile)
    }

    /// The profile that ships with the crate.
    pub fn builtin() -> Self {
        Self {
            subject: BUILTIN_SUBJECT.to_string(),
            text: BUILTIN_PROFILE.to_string(),
        }
    }

    /// Same built-in text, attributed to another subject name.
    pub fn builtin_for(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text: BUILTIN_PROFILE.to_string(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Build the delegate prompt for one visitor message.
    pub fn compose_prompt(&self, utterance: &str) -> String {
        format!(
            "You are a helpful assistant answering questions about {}'s professional background. \
             Use this context to answer questions accurately and concisely.\n\n\
             Context:\n{}\n\n\
             Question: {}\n\n\
             {}",
            self.subject,
            self.text.trim(),
            utterance,
            ANSWER_MARKER
        )
    }
}

impl Default for KnowledgeProfile {
    fn default() -> Self {
        Self::builtin()
    }
}
