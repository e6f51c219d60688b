//! Unified error types for tinymonitor
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::fmt;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a notification provider
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// No alert provider is enabled
    #[error("No alert providers are enabled")]
    NoProviders,

    /// Provider name not known or not enabled
    #[error("Provider '{0}' is not enabled or does not exist")]
    ProviderNotFound(String),

    /// Some providers failed during a test alert
    #[error("{failed} of {total} provider(s) failed to deliver the test alert")]
    TestAlertFailed { failed: usize, total: usize },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while collecting a metric
#[derive(Error, Debug)]
pub enum CollectError {
    /// Reading an OS statistics file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The metric is not available on this platform
    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    /// OS statistics could not be parsed
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        source_name: &'static str,
        message: String,
    },
}

/// Errors from notification delivery
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Provider is missing a required setting
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("Failed to send alert: status {0}")]
    Status(u16),

    /// Email construction or SMTP transport failure
    #[error("Email error: {0}")]
    Email(String),

    /// Invalid header name or value in the provider configuration
    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single configuration validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All validation failures found in one configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to read or parse a config file
    #[error("Failed to parse configuration {path}: {message}")]
    ParseError { path: String, message: String },

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// One or more validation rules failed
    #[error("Invalid configuration:\n{0}")]
    Validation(ValidationErrors),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
