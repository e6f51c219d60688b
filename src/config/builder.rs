//! Configuration builder
//!
//! Merges the loaded configuration with CLI overrides and validates it.

use crate::config::file::ConfigSource;
use crate::config::{validate, Config, ConfigFile};
use crate::error::ConfigError;
use std::path::Path;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
    source: ConfigSource,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            source: ConfigSource::Defaults,
        }
    }

    /// Load configuration through the search cascade
    pub fn with_file(mut self, path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, source) = ConfigFile::resolve(path)?;
        self.config = config;
        self.source = source;
        Ok(self)
    }

    /// Override the refresh interval
    pub fn with_refresh(mut self, refresh: Option<i64>) -> Self {
        if let Some(r) = refresh {
            self.config.refresh = r;
        }
        self
    }

    /// Override the cooldown
    pub fn with_cooldown(mut self, cooldown: Option<i64>) -> Self {
        if let Some(c) = cooldown {
            self.config.cooldown = c;
        }
        self
    }

    /// Where the configuration was loaded from
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Validate and return the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let errors = validate::validate(&self.config);
        if errors.is_empty() {
            Ok(self.config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Return the configuration without validating it
    pub fn build_unchecked(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
