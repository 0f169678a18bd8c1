//! Text-generation delegate seam.
//!
//! A delegate is an optional, best-effort source of answers that the engine
//! consults before its rule table. Implementations may fail in any way they
//! like; the engine treats every failure as "no answer".

use std::future::Future;

use async_trait::async_trait;

use crate::error::ChatError;

/// External text-generation capability.
#[async_trait]
pub trait TextDelegate: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Generate an answer for `prompt`.
    ///
    /// `Ok(None)` means the delegate had nothing to say.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ChatError>;
}

/// Adapts an async closure into a [`TextDelegate`].
pub struct FnDelegate<F> {
    name: String,
    func: F,
}

impl<F, Fut> FnDelegate<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, ChatError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F, Fut> TextDelegate for FnDelegate<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, ChatError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<Option<String>, ChatError> {
        (self.func)(prompt.to_string()).await
    }
}
