//! Validate command implementation

use crate::config::ConfigBuilder;
use crate::error::Result;
use std::path::Path;

/// Execute the validate command
///
/// Every problem is reported at once through the returned error.
pub fn run_validate(config_path: Option<&Path>) -> Result<()> {
    let builder = ConfigBuilder::new().with_file(config_path)?;
    let source = builder.source().clone();
    builder.build()?;

    println!("Configuration OK ({})", source);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ConfigError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_file() {
        let file = config_file("refresh = 5\n[cpu]\nwarning = 60.0\n");
        assert!(run_validate(Some(file.path())).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let file = config_file(
            "refresh = 0\ncooldown = -5\n[alerts.ntfy]\nenabled = true\n",
        );
        match run_validate(Some(file.path())) {
            Err(AppError::Config(ConfigError::Validation(errors))) => {
                assert_eq!(errors.len(), 3);
            }
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = run_validate(Some(Path::new("/nonexistent/tinymonitor.toml")));
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::FileNotFound(_)))
        ));
    }
}
