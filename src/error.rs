//! Error types and result aliases for mantweak.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used for I/O paths
//! - [`ConfigError`]: Fatal startup misconfiguration (bad tab stop, level count,
//!   or an unusable glyph width table)
//!
//! The formatting engine itself has no error category: any input line is
//! classified and rendered deterministically.

use std::path::PathBuf;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// Configuration problems detected before any input is read.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Tab stop below the minimum of 2.
    #[error("tabstop must be greater than 1 (got {0})")]
    Tabstop(usize),

    /// Margin stack without any level.
    #[error("levels must be at least 1 (got {0})")]
    Levels(usize),

    /// A table detection threshold set to zero.
    #[error("{name} must be at least 1")]
    ColumnRule { name: &'static str },

    /// Width table file could not be read.
    #[error("can't open width table {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Width table file is not valid TOML for the expected layout.
    #[error("can't parse width table {}: {source}", path.display())]
    FontParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Width table parsed but contains unusable entries.
    #[error("invalid width table {}: {reason}", path.display())]
    FontInvalid { path: PathBuf, reason: String },

    /// Config file could not be read or parsed.
    #[error("can't load config {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::Tabstop(1);
        assert_eq!(err.to_string(), "tabstop must be greater than 1 (got 1)");

        let err = ConfigError::Levels(0);
        assert_eq!(err.to_string(), "levels must be at least 1 (got 0)");

        let err = ConfigError::ColumnRule {
            name: "table_min_gap",
        };
        assert_eq!(err.to_string(), "table_min_gap must be at least 1");
    }

    #[test]
    fn test_font_invalid_mentions_path() {
        let err = ConfigError::FontInvalid {
            path: PathBuf::from("/tmp/widths.toml"),
            reason: "width of 'a' is zero".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/widths.toml"));
        assert!(msg.contains("zero"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        fn fails() -> Result<()> {
            Err(ConfigError::Levels(0))?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
