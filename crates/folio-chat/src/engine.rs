//! Response engine: maps a visitor message to one reply string.
//!
//! `respond` is the deterministic path: a pure lookup in the rule table.
//! `respond_async` optionally asks a text-generation delegate first and
//! falls back to `respond` when the delegate fails, panics, times out, or
//! has nothing to say. Neither path returns an error.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use folio_core::config::FolioConfig;

use crate::delegate::TextDelegate;
use crate::error::ChatError;
use crate::profile::KnowledgeProfile;
use crate::rules::{portfolio_rules, RuleMatch, RuleTable, DEFAULT_RESPONSE};

/// Delegate time budget when none is configured.
pub const DEFAULT_DELEGATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Stateless responder over a shared rule table and knowledge profile.
///
/// Cloning is cheap; clones share the same table, profile, and delegate.
#[derive(Clone)]
pub struct ResponseEngine {
    rules: Arc<RuleTable>,
    profile: Arc<KnowledgeProfile>,
    delegate: Option<Arc<dyn TextDelegate>>,
    delegate_timeout: Duration,
}

impl ResponseEngine {
    /// Create an engine with no delegate.
    pub fn new(rules: RuleTable, profile: KnowledgeProfile) -> Self {
        Self {
            rules: Arc::new(rules),
            profile: Arc::new(profile),
            delegate: None,
            delegate_timeout: DEFAULT_DELEGATE_TIMEOUT,
        }
    }

    /// Build the rule table and profile described by `config`.
    ///
    /// No delegate is attached; callers wire one with [`with_delegate`].
    ///
    /// [`with_delegate`]: ResponseEngine::with_delegate
    pub fn from_config(config: &FolioConfig) -> Result<Self, ChatError> {
        let rules = if config.chat.rules.is_empty() {
            let builtin = portfolio_rules();
            match config.chat.default_response {
                Some(ref text) => RuleTable::new(builtin.rules().to_vec(), text.clone())?,
                None => builtin,
            }
        } else {
            let default = config
                .chat
                .default_response
                .clone()
                .unwrap_or_else(|| DEFAULT_RESPONSE.to_string());
            RuleTable::from_config(&config.chat.rules, default)?
        };

        let profile = match config.profile.path {
            Some(ref path) => {
                KnowledgeProfile::from_file(config.profile.subject.clone(), Path::new(path))?
            }
            None => KnowledgeProfile::builtin_for(config.profile.subject.clone()),
        };

        tracing::info!(
            rules = rules.len(),
            subject = %profile.subject(),
            "Response engine configured"
        );

        Ok(Self::new(rules, profile)
            .with_delegate_timeout(Duration::from_millis(config.chat.delegate_timeout_ms)))
    }

    /// Attach a delegate consulted by [`respond_async`](ResponseEngine::respond_async).
    pub fn with_delegate(mut self, delegate: Arc<dyn TextDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn with_delegate_timeout(mut self, timeout: Duration) -> Self {
        self.delegate_timeout = timeout;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn profile(&self) -> &KnowledgeProfile {
        &self.profile
    }

    pub fn delegate(&self) -> Option<&Arc<dyn TextDelegate>> {
        self.delegate.as_ref()
    }

    pub fn delegate_timeout(&self) -> Duration {
        self.delegate_timeout
    }

    /// Deterministic reply for `utterance`. Always non-empty.
    pub fn respond(&self, utterance: &str) -> String {
        match self.rules.lookup(utterance) {
            RuleMatch::Rule { index, response } => {
                tracing::debug!(rule = index, "Rule matched");
                response.to_string()
            }
            RuleMatch::Default(response) => {
                tracing::debug!("No rule matched, using default response");
                response.to_string()
            }
        }
    }

    /// Reply using the attached delegate, if any, then the rule table.
    pub async fn respond_async(&self, utterance: &str) -> String {
        self.respond_with(utterance, self.delegate.clone()).await
    }

    /// Reply using `delegate` instead of the attached one.
    ///
    /// Returns within the delegate timeout plus scheduling overhead.
    pub async fn respond_with(
        &self,
        utterance: &str,
        delegate: Option<Arc<dyn TextDelegate>>,
    ) -> String {
        let Some(delegate) = delegate else {
            return self.respond(utterance);
        };

        match self.consult(delegate.clone(), utterance).await {
            Ok(answer) => {
                tracing::debug!(delegate = %delegate.name(), "Delegate answered");
                answer
            }
            Err(e) => {
                tracing::warn!(
                    delegate = %delegate.name(),
                    error = %e,
                    "Delegate unavailable, falling back to rule matching"
                );
                self.respond(utterance)
            }
        }
    }

    /// Run one bounded delegate call. Any outcome other than a non-blank
    /// answer is an error.
    async fn consult(
        &self,
        delegate: Arc<dyn TextDelegate>,
        utterance: &str,
    ) -> Result<String, ChatError> {
        let prompt = self.profile.compose_prompt(utterance);
        let task = tokio::spawn(async move { delegate.generate(&prompt).await });
        let abort = task.abort_handle();

        let outcome = match tokio::time::timeout(self.delegate_timeout, task).await {
            Ok(joined) => joined,
            Err(_) => {
                abort.abort();
                return Err(ChatError::DelegateTimeout(self.delegate_timeout));
            }
        };

        match outcome {
            Ok(Ok(Some(answer))) if !answer.trim().is_empty() => Ok(answer),
            Ok(Ok(_)) => Err(ChatError::Delegate("empty answer".to_string())),
            Ok(Err(e)) => Err(e),
            Err(join_err) => Err(ChatError::Delegate(format!(
                "delegate task failed: {}",
                join_err
            ))),
        }
    }
}

impl Default for ResponseEngine {
    fn default() -> Self {
        Self::new(portfolio_rules(), KnowledgeProfile::builtin())
    }
}

impl std::fmt::Debug for ResponseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseEngine")
            .field("rules", &self.rules.len())
            .field("subject", &self.profile.subject())
            .field("delegate", &self.delegate.as_ref().map(|d| d.name().to_string()))
            .field("delegate_timeout", &self.delegate_timeout)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
