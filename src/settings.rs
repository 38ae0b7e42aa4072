use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "RUSTY_DASH_CONFIG";
/// Settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "rusty-dash.json";

/// Dashboard tuning knobs. Every field has a default, so a settings file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Decimal places for displayed and CSV-exported statistics.
    pub display_precision: u32,
    /// Numeric columns pre-selected for analysis after a load.
    pub default_selected_columns: usize,
    pub histogram_buckets: usize,
    /// Rows shown in the data preview and fed to charts.
    pub preview_rows: usize,
    /// `|r|` from which correlations are emphasised and listed.
    pub strong_correlation: f64,
    /// Columns with more unique values than this get no filter widget.
    pub max_filter_values: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_precision: 2,
            default_selected_columns: 3,
            histogram_buckets: 10,
            preview_rows: 100,
            strong_correlation: 0.7,
            max_filter_values: 50,
        }
    }
}

impl Settings {
    /// Read and validate a JSON settings file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// The settings file to use, if any: `$RUSTY_DASH_CONFIG`, else
    /// `rusty-dash.json` in the working directory when it exists.
    pub fn discover_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(explicit));
        }
        let local = PathBuf::from(CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Load the discovered settings file, or defaults when there is none.
    pub fn discover() -> Result<Self, SettingsError> {
        match Self::discover_path() {
            Some(path) => {
                log::info!("loading settings from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.histogram_buckets == 0 {
            return Err(SettingsError::Invalid {
                field: "histogram_buckets",
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.strong_correlation) {
            return Err(SettingsError::Invalid {
                field: "strong_correlation",
                reason: format!("{} is outside [0, 1]", self.strong_correlation),
            });
        }
        Ok(())
    }
}
