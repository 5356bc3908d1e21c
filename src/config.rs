use std::{env, path::PathBuf};

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::combinator::{ErrorModes, RefreshMode};
use crate::core::LogicalOperator;

const CONFIG: &str = include_str!("../.config/config.json5");

/// File the table filter memory is saved to
pub const SNAPSHOT_FILE: &str = "filters.json";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// Behaviour of a filter combinator and the strategies it creates
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub refresh_mode: RefreshMode,
    /// Joins column fragments
    pub operator: LogicalOperator,
    /// Joins the column part with the table's base filter
    pub base_filter_operator: LogicalOperator,
    pub base_filter_enabled: bool,
    /// Remember column filters per table
    pub keep_filters: bool,
    /// Columns with more distinct values fall back to no filter; `None` scans without limit
    pub distinct_value_cap: Option<usize>,
    /// Offer the `<x<` range operator in numeric and date filters
    pub between_operator: bool,
    /// chrono formats accepted for date input; ISO is always accepted
    pub date_formats: Vec<String>,
    pub case_sensitive: bool,
    pub log_errors: ErrorModes,
    pub notify_errors: ErrorModes,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            refresh_mode: RefreshMode::OnInput,
            operator: LogicalOperator::And,
            base_filter_operator: LogicalOperator::And,
            base_filter_enabled: true,
            keep_filters: false,
            distinct_value_cap: Some(100),
            between_operator: true,
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%m/%d/%Y".to_string(),
                "%d.%m.%Y".to_string(),
            ],
            case_sensitive: false,
            log_errors: ErrorModes::OFF,
            notify_errors: ErrorModes::GENERAL,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub filters: FilterSettings,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Layer embedded defaults, `~/.gridfilter-config.json5`, the explicit
    /// file and `GRIDFILTER_*` environment variables, later sources winning.
    ///
    /// Nested keys use a double underscore, e.g. `GRIDFILTER_FILTERS__KEEP_FILTERS=true`.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5))
            .add_source(
                config::File::from(default_home_config_path())
                    .format(config::FileFormat::Json5)
                    .required(false),
            );

        if let Some(p) = config_path {
            builder = builder.add_source(
                config::File::from(expand_tilde(p))
                    .format(config::FileFormat::Json5)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&PROJECT_NAME)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Where the table filter memory is persisted
    pub fn snapshot_path(&self) -> PathBuf {
        let dir = if self.config.data_dir.as_os_str().is_empty() {
            get_data_dir()
        } else {
            self.config.data_dir.clone()
        };
        dir.join(SNAPSHOT_FILE)
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str()
        && s.starts_with('~')
        && let Some(base) = BaseDirs::new()
    {
        return PathBuf::from(s.replacen('~', base.home_dir().to_str().unwrap_or(""), 1));
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".gridfilter-config.json5");
    }
    PathBuf::from(".gridfilter-config.json5")
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".config")
    }
}
