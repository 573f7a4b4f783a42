//! Addressable configuration keys for `config get/set/list`.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};

/// One `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DatabasePath,
    ResolverMaxAirwaySegmentNm,
    ResolverMaxDirectSegmentNm,
    ProgressBatchRows,
    ProgressReportIntervalMs,
    ProgressMaxReportSteps,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::DatabasePath,
            ConfigKey::ResolverMaxAirwaySegmentNm,
            ConfigKey::ResolverMaxDirectSegmentNm,
            ConfigKey::ProgressBatchRows,
            ConfigKey::ProgressReportIntervalMs,
            ConfigKey::ProgressMaxReportSteps,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    pub fn section(self) -> &'static str {
        match self {
            ConfigKey::DatabasePath => "database",
            ConfigKey::ResolverMaxAirwaySegmentNm | ConfigKey::ResolverMaxDirectSegmentNm => {
                "resolver"
            }
            ConfigKey::ProgressBatchRows
            | ConfigKey::ProgressReportIntervalMs
            | ConfigKey::ProgressMaxReportSteps => "progress",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(self) -> &'static str {
        match self {
            ConfigKey::DatabasePath => "path",
            ConfigKey::ResolverMaxAirwaySegmentNm => "max_airway_segment_nm",
            ConfigKey::ResolverMaxDirectSegmentNm => "max_direct_segment_nm",
            ConfigKey::ProgressBatchRows => "batch_rows",
            ConfigKey::ProgressReportIntervalMs => "report_interval_ms",
            ConfigKey::ProgressMaxReportSteps => "max_report_steps",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it is stored in the file.
    pub fn get(self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::DatabasePath => config.database.path.display().to_string(),
            ConfigKey::ResolverMaxAirwaySegmentNm => {
                config.resolver.max_airway_segment_nm.to_string()
            }
            ConfigKey::ResolverMaxDirectSegmentNm => {
                config.resolver.max_direct_segment_nm.to_string()
            }
            ConfigKey::ProgressBatchRows => config.progress.batch_rows.to_string(),
            ConfigKey::ProgressReportIntervalMs => config.progress.report_interval_ms.to_string(),
            ConfigKey::ProgressMaxReportSteps => config.progress.max_report_steps.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Parse and apply `value`.
    pub fn set(self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::DatabasePath => config.database.path = self.parse_path(value)?,
            ConfigKey::ResolverMaxAirwaySegmentNm => {
                config.resolver.max_airway_segment_nm = self.parse_distance(value)?
            }
            ConfigKey::ResolverMaxDirectSegmentNm => {
                config.resolver.max_direct_segment_nm = self.parse_distance(value)?
            }
            ConfigKey::ProgressBatchRows => {
                config.progress.batch_rows = self.parse_count(value, 1)?
            }
            ConfigKey::ProgressReportIntervalMs => {
                config.progress.report_interval_ms = self.parse_count(value, 0)?
            }
            ConfigKey::ProgressMaxReportSteps => {
                config.progress.max_report_steps = self.parse_count(value, 0)?
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(ConfigError::invalid(&self.name(), value, "must not be empty"));
                }
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingDirectory => config.logging.directory = self.parse_path(value)?,
        }
        Ok(())
    }

    fn parse_path(self, value: &str) -> Result<PathBuf, ConfigError> {
        if value.is_empty() {
            return Err(ConfigError::invalid(&self.name(), value, "path must not be empty"));
        }
        Ok(expand_tilde(value))
    }

    fn parse_distance(self, value: &str) -> Result<f64, ConfigError> {
        let nm: f64 = value
            .parse()
            .map_err(|_| ConfigError::invalid(&self.name(), value, "expected a number"))?;
        if !nm.is_finite() || nm <= 0.0 {
            return Err(ConfigError::invalid(
                &self.name(),
                value,
                "expected a positive distance in nautical miles",
            ));
        }
        Ok(nm)
    }

    fn parse_count(self, value: &str, min: u64) -> Result<u64, ConfigError> {
        let count: u64 = value
            .parse()
            .map_err(|_| ConfigError::invalid(&self.name(), value, "expected an integer"))?;
        if count < min {
            return Err(ConfigError::invalid(
                &self.name(),
                value,
                format!("must be at least {min}"),
            ));
        }
        Ok(count)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_tilde(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(value)),
        None => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert!(matches!(
            "resolver.speed".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::ResolverMaxAirwaySegmentNm
            .set(&mut config, "420.5")
            .unwrap();
        assert_eq!(config.resolver.max_airway_segment_nm, 420.5);
        assert_eq!(ConfigKey::ResolverMaxAirwaySegmentNm.get(&config), "420.5");
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::ResolverMaxDirectSegmentNm
            .set(&mut config, "-5")
            .is_err());
        assert!(ConfigKey::ProgressBatchRows.set(&mut config, "0").is_err());
        assert!(ConfigKey::ProgressReportIntervalMs
            .set(&mut config, "0")
            .is_ok());
        assert!(ConfigKey::LoggingLevel.set(&mut config, "  ").is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let mut config = ConfigFile::default();
        ConfigKey::DatabasePath
            .set(&mut config, "~/nav/db.sqlite")
            .unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.database.path, home.join("nav/db.sqlite"));
        }
    }
}
