//! Configuration file loading
//!
//! Handles loading configuration from TOML files and the search cascade.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file, without validating it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Resolve and load configuration
    ///
    /// An explicit path must exist. Without one, the first file found in
    /// [`ConfigFile::default_paths`] wins, else the built-in defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Config, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        Self::resolve_from(&Self::default_paths())
    }

    /// Load the first existing file among `paths`
    pub fn resolve_from(paths: &[PathBuf]) -> Result<(Config, ConfigSource), ConfigError> {
        match paths.iter().find(|p| p.exists()) {
            Some(path) => {
                let config = Self::load(path)?;
                Ok((config, ConfigSource::File(path.clone())))
            }
            None => Ok((Config::default(), ConfigSource::Defaults)),
        }
    }

    /// Search locations, highest priority first
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("tinymonitor").join("config.toml"));
        }

        paths.push(PathBuf::from("/etc/tinymonitor/config.toml"));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_paths_order() {
        let paths = ConfigFile::default_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("config.toml")));
        assert_eq!(
            paths.last(),
            Some(&PathBuf::from("/etc/tinymonitor/config.toml"))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let result = ConfigFile::resolve(Some(Path::new("/nonexistent/tinymonitor.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let file = write_config("refresh = 5\n[cpu]\nenabled = false\n");
        let (config, source) = ConfigFile::resolve(Some(file.path())).unwrap();
        assert_eq!(config.refresh, 5);
        assert!(!config.cpu.enabled);
        assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let file = write_config("refresh = \"soon\"\n");
        let err = ConfigFile::load(file.path()).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cascade_picks_first_existing() {
        let second = write_config("cooldown = 30\n");
        let third = write_config("cooldown = 90\n");
        let paths = vec![
            PathBuf::from("/nonexistent/first.toml"),
            second.path().to_path_buf(),
            third.path().to_path_buf(),
        ];

        let (config, source) = ConfigFile::resolve_from(&paths).unwrap();
        assert_eq!(config.cooldown, 30);
        assert_eq!(source, ConfigSource::File(second.path().to_path_buf()));
    }

    #[test]
    fn test_cascade_falls_back_to_defaults() {
        let paths = vec![PathBuf::from("/nonexistent/a.toml")];
        let (config, source) = ConfigFile::resolve_from(&paths).unwrap();
        assert_eq!(config.refresh, 2);
        assert_eq!(source, ConfigSource::Defaults);
    }
}
