//! Runtime configuration for managers and engines.
//!
//! Built-in defaults cover every value. A TOML file may override them, and
//! `PIMKIT`-prefixed environment variables override both (for example
//! `PIMKIT__REQUEST__TIMEOUT_MS=5000`).

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Settings of one organizer manager and its default engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Wait-bound behavior of the manager's convenience calls
    #[serde(default)]
    pub request: RequestConfig,

    /// Recurrence expansion limits
    #[serde(default)]
    pub expansion: ExpansionConfig,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            request: RequestConfig::default(),
            expansion: ExpansionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// How long a convenience call waits for its request before cancelling
    /// it and recording a timeout, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Bound on generated occurrences per series when a fetch does not state
    /// its own maximum
    #[serde(default = "default_max_generated_occurrences")]
    pub max_generated_occurrences: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_generated_occurrences: default_max_generated_occurrences(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_max_generated_occurrences() -> usize {
    1000
}

impl OrganizerConfig {
    /// Loads configuration with ascending priority: defaults, then the
    /// optional TOML file at `path`, then environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("PIMKIT")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request.timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "request.timeout_ms must be greater than zero".to_string(),
            )));
        }
        if self.expansion.max_generated_occurrences == 0 {
            return Err(Error::Config(ConfigError::Message(
                "expansion.max_generated_occurrences must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod config_test;
