//! Shared setup for commands that touch the database.

use tracing::info;

use navcompiler::config::ConfigFile;
use navcompiler::logging::{init_logging, LoggingGuard, LoggingOptions, LOG_FILE_NAME};

use crate::error::CliError;

/// Loaded configuration plus the active logger.
pub struct CliRunner {
    config: ConfigFile,
    logging: LoggingGuard,
}

impl CliRunner {
    /// Load the config file and install logging.
    ///
    /// Must run before any thread is spawned (signal handler included).
    /// With `verbose` logs also go to stderr at debug level.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let level = if verbose {
            "debug".to_string()
        } else {
            config.logging.level.clone()
        };
        let logging = init_logging(&LoggingOptions {
            level,
            directory: Some(config.logging.directory.clone()),
            file_name: LOG_FILE_NAME.to_string(),
            stderr: verbose,
        })?;

        Ok(Self { config, logging })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            command = command,
            version = env!("CARGO_PKG_VERSION"),
            log_file = ?self.logging.log_file(),
            "navcompiler starting"
        );
    }
}
