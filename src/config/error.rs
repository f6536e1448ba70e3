//! Configuration error types.
//!
//! The countdown engine itself never fails; these errors only arise when
//! reading or validating user supplied configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured duration or start position is out of range.
    #[error("無効な設定です: {0}")]
    InvalidDuration(String),

    /// An explicitly requested configuration file does not exist.
    #[error("設定ファイルが見つかりません: {}", .0.display())]
    NotFound(PathBuf),

    /// The configuration file could not be read.
    #[error("設定ファイルの読み込みに失敗しました: {}", .path.display())]
    Read {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::CountdownConfig`].
    #[error("設定ファイルの解析に失敗しました: {}", .path.display())]
    Parse {
        /// Path of the file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidDuration(_) => "--duration と --start-at の値を確認してください",
            Self::NotFound(_) => "--config に正しいパスを指定してください",
            Self::Read { .. } => "ファイルの権限を確認してください",
            Self::Parse { .. } => "JSONの形式を確認してください",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> ConfigError {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        ConfigError::Parse {
            path: PathBuf::from("/tmp/config.json"),
            source,
        }
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidDuration("too long".to_string());
        assert!(err.to_string().contains("too long"));

        let err = ConfigError::NotFound(PathBuf::from("/missing.json"));
        assert!(err.to_string().contains("/missing.json"));

        assert!(parse_error().to_string().contains("/tmp/config.json"));
    }

    #[test]
    fn test_suggestion() {
        assert!(ConfigError::InvalidDuration("x".into())
            .suggestion()
            .contains("--duration"));
        assert!(ConfigError::NotFound(PathBuf::from("x"))
            .suggestion()
            .contains("--config"));
        assert!(parse_error().suggestion().contains("JSON"));
    }
}
