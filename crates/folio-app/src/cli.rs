//! CLI argument definitions for the Folio application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use folio_core::types::DelegateMode;
use folio_core::FolioConfig;

/// Folio — a terminal chat widget answering questions about a portfolio.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Response mode: pattern or inference.
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<DelegateMode>,

    /// Knowledge profile file replacing the built-in one.
    #[arg(short = 'p', long = "profile")]
    pub profile: Option<PathBuf>,

    /// Delegate time budget in milliseconds.
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Answer a single message and exit instead of starting the chat loop.
    #[arg(short = 'a', long = "ask")]
    pub ask: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FOLIO_CONFIG env var > platform default (~/.folio/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("FOLIO_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the response mode.
    ///
    /// Priority: --mode flag > FOLIO_MODE env var > config file value.
    pub fn resolve_mode(&self, config_mode: DelegateMode) -> DelegateMode {
        if let Some(mode) = self.mode {
            return mode;
        }
        if let Ok(val) = std::env::var("FOLIO_MODE") {
            if let Ok(mode) = val.parse::<DelegateMode>() {
                return mode;
            }
        }
        config_mode
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Fold every override into a loaded configuration.
    pub fn apply(&self, config: &mut FolioConfig) {
        config.chat.mode = self.resolve_mode(config.chat.mode);
        if let Some(level) = self.resolve_log_level() {
            config.general.log_level = level;
        }
        if let Some(ref path) = self.profile {
            config.profile.path = Some(path.to_string_lossy().to_string());
        }
        if let Some(ms) = self.timeout_ms {
            config.chat.delegate_timeout_ms = ms;
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".folio").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".folio").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::try_parse_from([
            "folio",
            "--config",
            "/tmp/folio.toml",
            "--log-level",
            "debug",
            "--mode",
            "inference",
            "--profile",
            "/tmp/profile.md",
            "--timeout-ms",
            "1500",
            "--ask",
            "What's your stack?",
        ])
        .unwrap();
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/folio.toml"));
        assert_eq!(args.mode, Some(DelegateMode::Inference));
        assert_eq!(args.ask.as_deref(), Some("What's your stack?"));

        let mut config = FolioConfig::default();
        args.apply(&mut config);
        assert_eq!(config.chat.mode, DelegateMode::Inference);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.profile.path.as_deref(), Some("/tmp/profile.md"));
        assert_eq!(config.chat.delegate_timeout_ms, 1500);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(CliArgs::try_parse_from(["folio", "--mode", "webllm"]).is_err());
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = CliArgs::try_parse_from(["folio"]).unwrap();
        let mut config = FolioConfig::default();
        config.general.log_level = "warn".to_string();
        config.chat.delegate_timeout_ms = 900;
        args.apply(&mut config);
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.chat.delegate_timeout_ms, 900);
        assert!(config.profile.path.is_none());
    }
}
