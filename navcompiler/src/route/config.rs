//! Resolver run configuration.

use std::time::Duration;

use super::schema::RouteSchema;
use crate::config::ConfigFile;
use crate::progress::{DEFAULT_BATCH_ROWS, DEFAULT_REPORT_INTERVAL};

/// Settings for one resolver run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub schema: RouteSchema,

    /// Segments longer than this are treated as data errors and skipped.
    pub max_segment_length_nm: f64,

    /// Records between progress checks.
    pub batch_rows: u64,

    /// Minimum wall time between progress reports.
    pub report_interval: Duration,
}

impl ResolverConfig {
    /// Defaults for the given schema.
    pub fn for_schema(schema: RouteSchema) -> Self {
        Self {
            schema,
            max_segment_length_nm: schema.default_max_segment_nm(),
            batch_rows: DEFAULT_BATCH_ROWS,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    /// Build from the user configuration file.
    pub fn from_config_file(config: &ConfigFile, schema: RouteSchema) -> Self {
        let max_segment_length_nm = match schema {
            RouteSchema::Airway => config.resolver.max_airway_segment_nm,
            RouteSchema::DirectRoute => config.resolver.max_direct_segment_nm,
        };

        Self {
            schema,
            max_segment_length_nm,
            batch_rows: config.progress.batch_rows,
            report_interval: Duration::from_millis(config.progress.report_interval_ms),
        }
    }

    pub fn with_max_segment_length_nm(mut self, nm: f64) -> Self {
        self.max_segment_length_nm = nm;
        self
    }

    pub fn with_batch_rows(mut self, rows: u64) -> Self {
        self.batch_rows = rows;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }
}
