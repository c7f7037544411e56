//! Error types for the CLI.
//!
//! Library errors from `vdl-ir` and `vdl-codegen` are wrapped here so the
//! binary can map every failure onto an exit code.

use std::path::PathBuf;
use thiserror::Error;
use vdl_ir::CompileError;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error loading the project manifest.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// The schema failed to compile.
    #[error("Schema failed to compile: {0}")]
    Compile(#[from] CompileError),

    /// One or more targets failed.
    #[error("{failed} of {total} target(s) failed")]
    Targets { failed: usize, total: usize },

    /// Bad command-line usage that clap cannot detect.
    #[error("{0}")]
    Usage(String),

    /// IR serialization failed.
    #[error("Failed to serialize IR: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Process exit code for this error.
    ///
    /// Compile errors exit with 2; everything else exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Compile(_) => 2,
            _ => 1,
        }
    }
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let compile = CliError::from(CompileError::file_not_found("main.vdl.json", None));
        assert_eq!(compile.exit_code(), 2);

        let config = CliError::from(ConfigError::not_found("vdl.toml"));
        assert_eq!(config.exit_code(), 1);

        let targets = CliError::Targets { failed: 1, total: 3 };
        assert_eq!(targets.exit_code(), 1);
        assert_eq!(targets.to_string(), "1 of 3 target(s) failed");
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::invalid_value("targets[0].plugin.command", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'targets[0].plugin.command': must not be empty"
        );
    }
}
