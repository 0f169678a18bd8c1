use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The visitor typing into the chat widget.
    User,
    /// The portfolio assistant.
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How responses are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegateMode {
    /// Deterministic rule matching only.
    #[default]
    Pattern,
    /// Ask the text-generation delegate first, fall back to rule matching.
    #[serde(alias = "ai")]
    Inference,
}

impl DelegateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelegateMode::Pattern => "pattern",
            DelegateMode::Inference => "inference",
        }
    }

    /// The other mode, used by the widget's mode toggle.
    pub fn toggled(self) -> Self {
        match self {
            DelegateMode::Pattern => DelegateMode::Inference,
            DelegateMode::Inference => DelegateMode::Pattern,
        }
    }
}

impl std::fmt::Display for DelegateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DelegateMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(DelegateMode::Pattern),
            "inference" | "ai" => Ok(DelegateMode::Inference),
            other => Err(format!(
                "unknown mode '{}', expected 'pattern' or 'inference'",
                other
            )),
        }
    }
}
