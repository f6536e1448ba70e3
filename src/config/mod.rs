//! Configuration file loading.
//!
//! Defaults for the CLI live in an optional JSON file. An explicitly given
//! path must exist; the default location is used only when present.

mod error;

use std::path::{Path, PathBuf};

use crate::types::CountdownConfig;

pub use error::ConfigError;

/// File name of the configuration inside the config directory.
const CONFIG_FILE_NAME: &str = "config.json";

/// Returns `<config dir>/countdown/config.json`, if a config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("countdown").join(CONFIG_FILE_NAME))
}

/// Loads the configuration.
///
/// With `Some(path)` the file must exist. With `None` the default location is
/// tried and [`CountdownConfig::default`] is returned if there is no file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is missing (explicit path only),
/// unreadable, or not valid JSON.
pub fn load_config(path: Option<&Path>) -> Result<CountdownConfig, ConfigError> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            read_config(path)
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(CountdownConfig::default())
            }
        },
    }
}

fn read_config(path: &Path) -> Result<CountdownConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("countdown/config.json"));
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"duration_ms": 90000, "auto_start": false}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.duration_ms, 90_000);
        assert!(!config.auto_start);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "duration = 5").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
