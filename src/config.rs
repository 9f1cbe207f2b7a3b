//! Application configuration.
//!
//! Layered: built-in defaults, then an optional config file under the
//! user config directory, then `WEBPILOT_`-prefixed environment
//! variables.

use std::path::PathBuf;

use config::{Config, Environment, File};
use privacy_shield::RedactionMode;
use serde::{Deserialize, Serialize};

use crate::errors::WebPilotError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ceiling for autonomous loop iterations.
    pub max_iterations: u32,
    /// Inter-action delay bounds, milliseconds.
    pub action_delay_min_ms: u64,
    pub action_delay_max_ms: u64,
    /// Per-keystroke delay bounds, milliseconds.
    pub keystroke_delay_min_ms: u64,
    pub keystroke_delay_max_ms: u64,
    /// What to do when screenshot redaction fails.
    pub redaction_mode: RedactionMode,
    /// Viewport the page driver should use.
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_iterations: agent_flow::DEFAULT_MAX_ITERATIONS,
            action_delay_min_ms: 300,
            action_delay_max_ms: 1500,
            keystroke_delay_min_ms: 50,
            keystroke_delay_max_ms: 150,
            redaction_mode: RedactionMode::Lenient,
            viewport_width: 1280,
            viewport_height: 800,
        }
    }
}

impl AppConfig {
    /// Load with file and environment layered over defaults.
    pub fn load() -> Result<Self, WebPilotError> {
        Self::load_from(Self::default_config_path())
    }

    pub fn load_from(path: Option<PathBuf>) -> Result<Self, WebPilotError> {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("max_iterations", defaults.max_iterations as u64)
            .and_then(|b| b.set_default("action_delay_min_ms", defaults.action_delay_min_ms))
            .and_then(|b| b.set_default("action_delay_max_ms", defaults.action_delay_max_ms))
            .and_then(|b| b.set_default("keystroke_delay_min_ms", defaults.keystroke_delay_min_ms))
            .and_then(|b| b.set_default("keystroke_delay_max_ms", defaults.keystroke_delay_max_ms))
            .and_then(|b| b.set_default("redaction_mode", "lenient"))
            .and_then(|b| b.set_default("viewport_width", defaults.viewport_width as u64))
            .and_then(|b| b.set_default("viewport_height", defaults.viewport_height as u64))
            .map_err(|e| WebPilotError::Config(e.to_string()))?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(Environment::with_prefix("WEBPILOT"));

        let config = builder
            .build()
            .map_err(|e| WebPilotError::Config(e.to_string()))?;
        let loaded: AppConfig = config
            .try_deserialize()
            .map_err(|e| WebPilotError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("webpilot").join("config.toml"))
    }

    fn validate(&self) -> Result<(), WebPilotError> {
        if self.max_iterations == 0 {
            return Err(WebPilotError::Config(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.action_delay_min_ms >= self.action_delay_max_ms
            || self.keystroke_delay_min_ms >= self.keystroke_delay_max_ms
        {
            return Err(WebPilotError::Config(
                "delay ranges must have min < max".into(),
            ));
        }
        Ok(())
    }

    pub fn pacing(&self) -> agent_flow::HumanPacing {
        agent_flow::HumanPacing::new(
            self.action_delay_min_ms..self.action_delay_max_ms,
            self.keystroke_delay_min_ms..self.keystroke_delay_max_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.redaction_mode, RedactionMode::Lenient);
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn file_overrides_defaults() {
        let file = config_file("max_iterations = 5\nredaction_mode = \"strict\"");

        let config = AppConfig::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.redaction_mode, RedactionMode::Strict);
        // Untouched keys keep their defaults.
        assert_eq!(config.viewport_width, 1280);
    }

    #[test]
    fn zero_iterations_rejected() {
        let file = config_file("max_iterations = 0");
        assert!(AppConfig::load_from(Some(file.path().to_path_buf())).is_err());
    }
}
