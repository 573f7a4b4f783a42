//! CLI error type.

use std::fmt;

use navcompiler::config::ConfigError;
use navcompiler::logging::LoggingError;
use navcompiler::{ResolveError, StoreError};

/// Errors reported to the user before exiting.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing setting.
    Config(String),

    /// Config file could not be read or written.
    ConfigFile(ConfigError),

    /// Logging could not be set up.
    Logging(LoggingError),

    /// Database access failed outside a resolver run.
    Store(StoreError),

    /// A resolver run failed.
    Resolve(ResolveError),

    /// Output could not be rendered.
    Output(String),

    /// The user interrupted a run and it was rolled back.
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled => 130,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Logging(e) => write!(f, "Failed to set up logging: {}", e),
            CliError::Store(e) => write!(f, "Database error: {}", e),
            CliError::Resolve(e) => write!(f, "Resolver failed: {}", e),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
            CliError::Cancelled => write!(f, "Cancelled, the interrupted run was rolled back"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Resolve(e) => Some(e),
            CliError::Config(_) | CliError::Output(_) | CliError::Cancelled => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<ResolveError> for CliError {
    fn from(e: ResolveError) -> Self {
        CliError::Resolve(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CliError::Config("database not found".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("database not found"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Cancelled.exit_code(), 130);
        assert_eq!(CliError::Output("x".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_from_store_error() {
        let err: CliError = StoreError::invalid_code("direction", "Q").into();
        assert!(matches!(err, CliError::Store(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
