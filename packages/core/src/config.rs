//! Engine configuration
//!
//! `GraphEngineConfig` controls traversal depth limits, the context window used by
//! the backlink extractor, and whether stale backlinks are cleared on a global pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard ceiling for any configured traversal depth.
/// Each hop fans out to every referencing page, so deep walks grow fast.
const MAX_SUPPORTED_DEPTH: u32 = 32;

/// Environment variable overriding `default_max_depth`
pub const ENV_DEFAULT_MAX_DEPTH: &str = "PAGEGRAPH_DEFAULT_MAX_DEPTH";
/// Environment variable overriding `max_allowed_depth`
pub const ENV_MAX_ALLOWED_DEPTH: &str = "PAGEGRAPH_MAX_ALLOWED_DEPTH";
/// Environment variable overriding `context_window`
pub const ENV_CONTEXT_WINDOW: &str = "PAGEGRAPH_CONTEXT_WINDOW";
/// Environment variable overriding `clear_stale_backlinks`
pub const ENV_CLEAR_STALE_BACKLINKS: &str = "PAGEGRAPH_CLEAR_STALE_BACKLINKS";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid_value(key: &str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// Configuration for backlink extraction and graph generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphEngineConfig {
    /// Depth used when a generation request does not specify one
    pub default_max_depth: u32,

    /// Largest depth a generation request may ask for
    pub max_allowed_depth: u32,

    /// Characters kept on each side of a `[[wiki]]` link when building its context
    pub context_window: usize,

    /// Whether a global extraction pass empties the backlinks of pages that
    /// received no inbound links in that pass
    pub clear_stale_backlinks: bool,
}

impl Default for GraphEngineConfig {
    fn default() -> Self {
        Self {
            default_max_depth: 2,
            max_allowed_depth: 8,
            context_window: 50,
            clear_stale_backlinks: true,
        }
    }
}

impl GraphEngineConfig {
    /// Build a config from defaults overridden by `PAGEGRAPH_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment, preferences file, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DEFAULT_MAX_DEPTH) {
            config.default_max_depth = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value(ENV_DEFAULT_MAX_DEPTH, raw.clone()))?;
        }

        if let Some(raw) = lookup(ENV_MAX_ALLOWED_DEPTH) {
            config.max_allowed_depth = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value(ENV_MAX_ALLOWED_DEPTH, raw.clone()))?;
        }

        if let Some(raw) = lookup(ENV_CONTEXT_WINDOW) {
            config.context_window = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value(ENV_CONTEXT_WINDOW, raw.clone()))?;
        }

        if let Some(raw) = lookup(ENV_CLEAR_STALE_BACKLINKS) {
            config.clear_stale_backlinks = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(ConfigError::invalid_value(ENV_CLEAR_STALE_BACKLINKS, raw)),
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_allowed_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "max_allowed_depth cannot exceed {}",
                MAX_SUPPORTED_DEPTH
            )));
        }

        if self.default_max_depth > self.max_allowed_depth {
            return Err(ConfigError::Invalid(format!(
                "default_max_depth ({}) exceeds max_allowed_depth ({})",
                self.default_max_depth, self.max_allowed_depth
            )));
        }

        if self.context_window == 0 {
            return Err(ConfigError::Invalid(
                "context_window must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
