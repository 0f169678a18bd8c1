use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FolioError, Result};
use crate::types::DelegateMode;

/// Top-level configuration for the Folio assistant.
///
/// Loaded from `~/.folio/config.toml` by default. Every section is optional;
/// missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl FolioConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FolioConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FolioError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// One authored response rule as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Keyword fragments; any one contained in the message activates the rule.
    pub triggers: Vec<String>,
    /// Canned reply returned when the rule matches.
    pub response: String,
}

/// Chat widget and response engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Whether the chat widget is available at all.
    pub enabled: bool,
    /// Pattern-only or delegate-first responses.
    pub mode: DelegateMode,
    /// Upper bound on a single delegate call, in milliseconds.
    pub delegate_timeout_ms: u64,
    /// Longest message the widget accepts, in characters.
    pub max_message_length: usize,
    /// Replaces the built-in reply used when no rule matches.
    pub default_response: Option<String>,
    /// Replaces the built-in opening assistant turn.
    pub greeting: Option<String>,
    /// Ordered rule table. Empty means the built-in portfolio rules.
    pub rules: Vec<RuleConfig>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: DelegateMode::Pattern,
            delegate_timeout_ms: 5_000,
            max_message_length: 2_000,
            default_response: None,
            greeting: None,
            rules: Vec::new(),
        }
    }
}

/// Knowledge profile source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Name of the person the profile describes.
    pub subject: String,
    /// File whose contents replace the built-in profile text.
    pub path: Option<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            subject: "Mir Shafeeq".to_string(),
            path: None,
        }
    }
}

/// Hosted text-generation endpoint used in inference mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Model inference URL.
    pub endpoint: String,
    /// Optional bearer token sent as `Authorization`.
    pub api_token: Option<String>,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub do_sample: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint:
                "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2"
                    .to_string(),
            api_token: None,
            max_new_tokens: 200,
            temperature: 0.7,
            top_p: 0.9,
            do_sample: true,
        }
    }
}
