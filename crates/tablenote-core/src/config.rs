//! Grid configuration.
//!
//! Loaded from TOML; every key is optional and falls back to the built-in defaults.
//!
//! ```toml
//! rows = 6
//! cols = 6
//! row-height = 40
//! col-width = 120
//! autofit-padding = 30
//! px-per-cell = 9
//! bold-px-per-cell = 10
//! history-limit = 1000
//! resize-history = "untracked" # or "commit-on-release"
//! ```

use crate::autofit::CharWidthMeasurer;
use crate::grid::MIN_COL_WIDTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of rows at session start.
pub const DEFAULT_ROWS: usize = 6;
/// Default number of columns at session start.
pub const DEFAULT_COLS: usize = 6;
/// Default row height (pixels).
pub const DEFAULT_ROW_HEIGHT: u32 = 40;
/// Default column width (pixels).
pub const DEFAULT_COL_WIDTH: u32 = 120;
/// Padding added to measured text by auto-fit (pixels).
pub const DEFAULT_AUTOFIT_PADDING: u32 = 30;

/// Whether column resizing is recorded in undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHistory {
    /// Resizing never touches history.
    #[default]
    Untracked,
    /// One history entry is committed when a resize ends with a changed width.
    CommitOnRelease,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The TOML could not be parsed.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Grid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GridConfig {
    /// Rows created at session start.
    pub rows: usize,
    /// Columns created at session start.
    pub cols: usize,
    /// Height of every new row.
    pub row_height: u32,
    /// Width of every new column, and the auto-fit floor.
    pub col_width: u32,
    /// Padding added to measured text.
    pub autofit_padding: u32,
    /// Approximate advance of one display cell, regular weight.
    pub px_per_cell: u32,
    /// Approximate advance of one display cell, bold weight.
    pub bold_px_per_cell: u32,
    /// Maximum number of undo entries kept.
    pub history_limit: usize,
    /// History policy for column resizing.
    pub resize_history: ResizeHistory,
}

impl Default for GridConfig {
    fn default() -> Self {
        let measurer = CharWidthMeasurer::default();
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            row_height: DEFAULT_ROW_HEIGHT,
            col_width: DEFAULT_COL_WIDTH,
            autofit_padding: DEFAULT_AUTOFIT_PADDING,
            px_per_cell: measurer.px_per_cell,
            bold_px_per_cell: measurer.bold_px_per_cell,
            history_limit: 1000,
            resize_history: ResizeHistory::Untracked,
        }
    }
}

impl GridConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |key: &'static str, value: u64| {
            if value == 0 {
                Err(ConfigError::Invalid {
                    key,
                    reason: "must be greater than zero".to_string(),
                })
            } else {
                Ok(())
            }
        };

        positive("rows", self.rows as u64)?;
        positive("cols", self.cols as u64)?;
        positive("row-height", u64::from(self.row_height))?;
        positive("px-per-cell", u64::from(self.px_per_cell))?;
        positive("bold-px-per-cell", u64::from(self.bold_px_per_cell))?;
        positive("history-limit", self.history_limit as u64)?;

        if self.col_width < MIN_COL_WIDTH {
            return Err(ConfigError::Invalid {
                key: "col-width",
                reason: format!("must be at least {MIN_COL_WIDTH}"),
            });
        }
        Ok(())
    }

    /// Measurer configured with this config's advances.
    pub fn measurer(&self) -> CharWidthMeasurer {
        CharWidthMeasurer {
            px_per_cell: self.px_per_cell,
            bold_px_per_cell: self.bold_px_per_cell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GridConfig::from_toml_str("").unwrap();
        assert_eq!(config, GridConfig::default());
        assert_eq!(config.rows, 6);
        assert_eq!(config.col_width, 120);
    }

    #[test]
    fn kebab_case_keys_override_defaults() {
        let config = GridConfig::from_toml_str(
            "rows = 3\ncol-width = 200\nresize-history = \"commit-on-release\"\n",
        )
        .unwrap();
        assert_eq!(config.rows, 3);
        assert_eq!(config.cols, DEFAULT_COLS);
        assert_eq!(config.col_width, 200);
        assert_eq!(config.resize_history, ResizeHistory::CommitOnRelease);
    }

    #[test]
    fn zero_and_narrow_values_are_rejected() {
        assert!(matches!(
            GridConfig::from_toml_str("rows = 0"),
            Err(ConfigError::Invalid { key: "rows", .. })
        ));
        assert!(matches!(
            GridConfig::from_toml_str("col-width = 20"),
            Err(ConfigError::Invalid { key: "col-width", .. })
        ));
        assert!(matches!(
            GridConfig::from_toml_str("rows = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
