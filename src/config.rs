//! Configuration management for interaction.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session configuration.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Session configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Prompt text. Empty means `<user>@<host>> `.
    pub prompt: Option<String>,
    /// Signal names that end the session, e.g. `["INT", "TERM"]`.
    /// Empty means SIGINT, SIGQUIT and SIGTERM.
    pub exit_signals: Vec<String>,
    /// Delay before resuming when SIGCONT cannot be watched, in milliseconds.
    pub resume_delay_ms: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            prompt: None,
            exit_signals: Vec::new(),
            resume_delay_ms: 1000,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(prompt) = std::env::var("INTERACTION_PROMPT") {
            if !prompt.is_empty() {
                self.session.prompt = Some(prompt);
            }
        }

        if let Ok(signals) = std::env::var("INTERACTION_EXIT_SIGNALS") {
            let names: Vec<String> = signals
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !names.is_empty() {
                self.session.exit_signals = names;
            }
        }

        if let Ok(delay) = std::env::var("INTERACTION_RESUME_DELAY_MS") {
            if let Ok(delay) = delay.parse() {
                self.session.resume_delay_ms = delay;
            }
        }

        if let Ok(level) = std::env::var("INTERACTION_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref prompt) = args.prompt {
            self.session.prompt = Some(prompt.clone());
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// The configured prompt, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.session.prompt.as_deref().filter(|p| !p.is_empty())
    }

    /// Resume fallback delay.
    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.session.resume_delay_ms)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
