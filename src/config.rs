//! Configuration management for mantweak.
//!
//! This module provides the [`Config`] struct which controls all reformatting behavior.
//! Configuration can be loaded from:
//! - TOML files (`mantweak.toml`)
//! - Environment variables (`tabstop`, `font`)
//! - CLI arguments (which override everything else)
//!
//! Config files are auto-discovered in the user's home directory and in every
//! ancestor of the working directory, from the filesystem root downwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::format::{CellWidth, ColumnRules, FixedWidth, GlyphMetrics, WidthTable};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["mantweak.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_tabstop() -> usize {
    8
}
fn default_levels() -> usize {
    1
}
fn default_true() -> bool {
    true
}
fn default_trusted_rows() -> usize {
    ColumnRules::default().trusted_rows
}
fn default_min_gap() -> usize {
    ColumnRules::default().min_gap
}

/// Main configuration struct for mantweak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Tab expansion width (default: 8)
    #[serde(default = "default_tabstop")]
    pub tabstop: usize,

    /// Maximum nesting depth of the margin stack (default: 1)
    #[serde(default = "default_levels")]
    pub levels: usize,

    /// Insert a blank line where two kinds of text meet at the same margin
    /// (default: false). Also disables the space reserved per nesting level.
    #[serde(default)]
    pub blank_lines: bool,

    /// Detect and align tables (default: true); off means margins only
    #[serde(default = "default_true")]
    pub tables: bool,

    /// Proportional width table used to align tables
    #[serde(default)]
    pub font: Option<PathBuf>,

    /// Measure glyphs in terminal cells when no width table is given (default: false)
    #[serde(default)]
    pub cells: bool,

    /// Row count from which single-space column gaps are trusted (default: 3)
    #[serde(default = "default_trusted_rows")]
    pub table_trusted_rows: usize,

    /// Gap width required below the trusted row count (default: 2)
    #[serde(default = "default_min_gap")]
    pub table_min_gap: usize,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub tabstop: Option<usize>,
    pub levels: Option<usize>,
    pub blank_lines: Option<bool>,
    pub tables: Option<bool>,
    pub font: Option<PathBuf>,
    pub cells: Option<bool>,
    pub table_trusted_rows: Option<usize>,
    pub table_min_gap: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tabstop: 8,
            levels: 1,
            blank_lines: false,
            tables: true,
            font: None,
            cells: false,
            table_trusted_rows: 3,
            table_min_gap: 2,
        }
    }
}

impl Config {
    /// Smallest usable tab stop
    const MIN_TABSTOP: usize = 2;

    /// Validate configuration values
    ///
    /// Any error here is fatal: there is no partial-configuration mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tabstop < Self::MIN_TABSTOP {
            return Err(ConfigError::Tabstop(self.tabstop));
        }
        if self.levels == 0 {
            return Err(ConfigError::Levels(self.levels));
        }
        if self.table_trusted_rows == 0 {
            return Err(ConfigError::ColumnRule {
                name: "table_trusted_rows",
            });
        }
        if self.table_min_gap == 0 {
            return Err(ConfigError::ColumnRule {
                name: "table_min_gap",
            });
        }
        Ok(())
    }

    /// Read a partial configuration from a TOML file
    pub fn load_partial(path: &Path) -> Result<PartialConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let partial = Self::load_partial(path)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    pub fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.tabstop {
            self.tabstop = v;
        }
        if let Some(v) = partial.levels {
            self.levels = v;
        }
        if let Some(v) = partial.blank_lines {
            self.blank_lines = v;
        }
        if let Some(v) = partial.tables {
            self.tables = v;
        }
        if let Some(v) = &partial.font {
            self.set_font(v);
        }
        if let Some(v) = partial.cells {
            self.cells = v;
        }
        if let Some(v) = partial.table_trusted_rows {
            self.table_trusted_rows = v;
        }
        if let Some(v) = partial.table_min_gap {
            self.table_min_gap = v;
        }
    }

    /// Set the width table; an empty path switches proportional widths off
    pub fn set_font(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.font = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.to_path_buf())
        };
    }

    /// Discover config files from the home directory and the ancestors of `start_path`
    ///
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // root to current (less specific to more specific)
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// The first unreadable or malformed file stops the merge.
    pub fn from_discovered_files(start_path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for path in Self::discover_config_files(start_path) {
            let partial = Self::load_partial(&path)?;
            log::debug!("loaded config {}", path.display());
            config.apply_partial(&partial);
        }
        Ok(config)
    }

    /// Margin stack keeps one space per nesting level unless blank lines mark levels
    #[must_use]
    pub fn reserve_level_space(&self) -> bool {
        !self.blank_lines
    }

    /// Column detection thresholds
    #[must_use]
    pub fn column_rules(&self) -> ColumnRules {
        ColumnRules {
            trusted_rows: self.table_trusted_rows,
            min_gap: self.table_min_gap,
        }
    }

    /// Build the glyph width provider
    ///
    /// A width table wins over terminal cells; without either every
    /// character is one unit wide.
    pub fn glyph_metrics(&self) -> Result<Box<dyn GlyphMetrics>, ConfigError> {
        if let Some(path) = &self.font {
            return Ok(Box::new(WidthTable::from_toml_file(path)?));
        }
        if self.cells {
            return Ok(Box::new(CellWidth));
        }
        Ok(Box::new(FixedWidth))
    }
}
