use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const ENV_DATA_DIR: &str = "HEAVY_DUTY_DATA_DIR";
pub const ENV_EXPORT_DIR: &str = "HEAVY_DUTY_EXPORT_DIR";
pub const ENV_FONT: &str = "HEAVY_DUTY_FONT";
pub const ENV_LOG: &str = "HEAVY_DUTY_LOG";

const APP_DIR: &str = "heavy-duty";
const PLAN_FILE: &str = "plan.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Holds the collection blobs and the optional plan override
    pub data_dir: PathBuf,
    /// Where CSV exports are written
    pub export_dir: PathBuf,
    /// Optional TTF/OTF used for every egui text style
    pub font_path: Option<PathBuf>,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self, ConfigError> {
        let path_var = |key: &'static str| -> Result<Option<PathBuf>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(v) if v.is_empty() => Err(ConfigError::InvalidVar(key)),
                Some(v) => Ok(Some(PathBuf::from(v))),
            }
        };

        let data_dir = match path_var(ENV_DATA_DIR)? {
            Some(dir) => dir,
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR))
                .ok_or(ConfigError::MissingDirectory("data"))?,
        };
        let export_dir = match path_var(ENV_EXPORT_DIR)? {
            Some(dir) => dir,
            None => dirs::download_dir().unwrap_or_else(|| data_dir.clone()),
        };
        let font_path = path_var(ENV_FONT)?;
        let log_filter = match lookup(ENV_LOG) {
            None => "info".to_string(),
            Some(v) => v.into_string().map_err(|_| ConfigError::InvalidVar(ENV_LOG))?,
        };

        Ok(Self { data_dir, export_dir, font_path, log_filter })
    }

    pub fn plan_path(&self) -> PathBuf {
        self.data_dir.join(PLAN_FILE)
    }
}
