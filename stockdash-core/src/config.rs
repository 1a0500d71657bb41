//! Report configuration, read from TOML.
//!
//! ```toml
//! price_dir = "stock_data_csvs"
//! sector_file = "Sector_data - Sheet1.csv"
//! price_extension = "csv"
//! top_n = 10
//! date_formats = ["%m/%d/%Y", "%d-%m-%Y"]
//! export_dir = "out"
//! ```
//!
//! Every field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::DEFAULT_TOP_N;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "STOCKDASH_CONFIG";

/// Config file looked up in the working directory when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "stockdash.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory holding one price file per symbol.
    pub price_dir: PathBuf,
    /// Sector reference sheet.
    pub sector_file: PathBuf,
    /// Price file extension, without the dot.
    pub price_extension: String,
    /// Length of the top/bottom rankings.
    pub top_n: usize,
    /// Extra chrono formats tried on the `Date` column.
    pub date_formats: Vec<String>,
    /// Where to write exports; `None` disables them.
    pub export_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            price_dir: PathBuf::from("stock_data_csvs"),
            sector_file: PathBuf::from("Sector_data - Sheet1.csv"),
            price_extension: "csv".into(),
            top_n: DEFAULT_TOP_N,
            date_formats: vec!["%m/%d/%Y".into(), "%d-%m-%Y".into()],
            export_dir: None,
        }
    }
}

impl ReportConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find the config: `$STOCKDASH_CONFIG`, else `./stockdash.toml`, else defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".into()));
        }
        if self.price_extension.is_empty() || self.price_extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "price_extension must be non-empty and given without a dot, got {:?}",
                self.price_extension
            )));
        }
        Ok(())
    }
}
