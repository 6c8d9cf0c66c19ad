//! Planner configuration.
//!
//! Read from the JSON file named by `FARM_GANTT_CONFIG` when set, otherwise
//! defaults apply. `FARM_GANTT_OUTPUT_DIR` overrides `output_dir` either way.

use crate::palette::parse_color;
use crate::scenario::DelayMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FARM_GANTT_CONFIG";
pub const OUTPUT_DIR_ENV: &str = "FARM_GANTT_OUTPUT_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config io error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Directory that relative export paths are resolved against.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub default_mode: DelayMode,

    /// Worksheet name used for spreadsheet exports.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Category colors layered over every workflow's own palette.
    #[serde(default)]
    pub palette_overrides: BTreeMap<String, String>,

    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    #[serde(default = "default_row_height")]
    pub row_height: u32,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_sheet_name() -> String {
    "Gantt".to_string()
}

fn default_chart_width() -> u32 {
    960
}

fn default_row_height() -> u32 {
    28
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_mode: DelayMode::default(),
            sheet_name: default_sheet_name(),
            palette_overrides: BTreeMap::new(),
            chart_width: default_chart_width(),
            row_height: default_row_height(),
        }
    }
}

impl PlannerConfig {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: PlannerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file from the environment, then applies overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from_path(PathBuf::from(path))?,
            None => Self::default(),
        };
        if let Some(dir) = std::env::var_os(OUTPUT_DIR_ENV) {
            config.output_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sheet_name.trim().is_empty() || self.sheet_name.chars().count() > 31 {
            return Err(ConfigError::Invalid(format!(
                "sheet_name '{}' must be 1 to 31 characters",
                self.sheet_name
            )));
        }
        if self.chart_width == 0 || self.row_height == 0 {
            return Err(ConfigError::Invalid(
                "chart_width and row_height must be positive".into(),
            ));
        }
        for (category, color) in &self.palette_overrides {
            parse_color(color).map_err(|err| {
                ConfigError::Invalid(format!("palette override for '{category}': {err}"))
            })?;
        }
        Ok(())
    }

    /// Joins relative paths onto `output_dir`; absolute paths pass through.
    pub fn resolve_output_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{ "default_mode": "propagate", "sheet_name": "Plan" }"#).unwrap();

        let config = PlannerConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.default_mode, DelayMode::Propagate);
        assert_eq!(config.sheet_name, "Plan");
        assert_eq!(config.chart_width, 960);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn invalid_override_color_is_rejected() {
        let mut config = PlannerConfig::default();
        config
            .palette_overrides
            .insert("Compost".into(), "compost-brown".into());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn relative_paths_land_in_output_dir() {
        let mut config = PlannerConfig::default();
        config.output_dir = PathBuf::from("/tmp/gantt");
        assert_eq!(
            config.resolve_output_path("plan.xlsx"),
            PathBuf::from("/tmp/gantt/plan.xlsx")
        );
        assert_eq!(
            config.resolve_output_path("/srv/plan.xlsx"),
            PathBuf::from("/srv/plan.xlsx")
        );
    }
}
