//! User configuration file.
//!
//! Settings live in `~/.navcompiler/config.ini`:
//!
//! ```ini
//! [database]
//! path = /home/me/.navcompiler/navdata.sqlite
//!
//! [resolver]
//! max_airway_segment_nm = 1000
//! max_direct_segment_nm = 2000
//!
//! [progress]
//! batch_rows = 1000
//! report_interval_ms = 500
//! max_report_steps = 100
//!
//! [logging]
//! level = info
//! directory = /home/me/.navcompiler/logs
//! ```
//!
//! A missing file or key falls back to the defaults. CLI arguments override
//! file values when given.

mod keys;

pub use keys::ConfigKey;

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::progress::{DEFAULT_BATCH_ROWS, DEFAULT_REPORT_INTERVAL};
use crate::route::{DEFAULT_MAX_AIRWAY_SEGMENT_NM, DEFAULT_MAX_DIRECT_SEGMENT_NM};

/// Name of the per-user directory holding config, database and logs.
pub const APP_DIR_NAME: &str = ".navcompiler";

/// Config file name inside [`APP_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default number of progress steps granted to one resolver run.
pub const DEFAULT_MAX_REPORT_STEPS: u64 = 100;

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSection {
    /// Navigation database compiled into.
    pub path: PathBuf,
}

/// `[resolver]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSection {
    pub max_airway_segment_nm: f64,
    pub max_direct_segment_nm: f64,
}

/// `[progress]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSection {
    pub batch_rows: u64,
    pub report_interval_ms: u64,
    pub max_report_steps: u64,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    pub directory: PathBuf,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub resolver: ResolverSection,
    pub progress: ProgressSection,
    pub logging: LoggingSection,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let app_dir = config_directory();
        Self {
            database: DatabaseSection {
                path: app_dir.join("navdata.sqlite"),
            },
            resolver: ResolverSection {
                max_airway_segment_nm: DEFAULT_MAX_AIRWAY_SEGMENT_NM,
                max_direct_segment_nm: DEFAULT_MAX_DIRECT_SEGMENT_NM,
            },
            progress: ProgressSection {
                batch_rows: DEFAULT_BATCH_ROWS,
                report_interval_ms: DEFAULT_REPORT_INTERVAL.as_millis() as u64,
                max_report_steps: DEFAULT_MAX_REPORT_STEPS,
            },
            logging: LoggingSection {
                level: "info".to_string(),
                directory: app_dir.join("logs"),
            },
        }
    }
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Apply every key present in `ini` on top of the defaults.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Render all settings, defaults included.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }
}

/// Per-user application directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Path of the config file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}
