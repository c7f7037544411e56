//! Error types for code generation.
//!
//! [`GeneratorError`] and [`OutputError`] are scoped to a single target: a
//! failure in one never stops any other target from running.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error raised by a built-in generator or a plugin.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The plugin process could not be started.
    #[error("failed to spawn plugin '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The plugin exited with a non-zero status.
    #[error("plugin exited with {}{}", exit_description(.code), stderr_suffix(.stderr))]
    ExitStatus {
        /// Exit code, `None` when the process was killed by a signal.
        code: Option<i32>,
        /// Everything the plugin wrote to stderr.
        stderr: String,
    },

    /// The plugin's stdout is not JSON.
    #[error("plugin output is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The plugin's stdout is JSON but not a response document.
    #[error("plugin output is not a valid response: {0}")]
    InvalidResponse(String),

    /// A generated file path escapes the output root.
    #[error("invalid output path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The plugin did not finish before its deadline.
    #[error("plugin timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// I/O failure talking to the plugin.
    #[error("plugin I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No generator is registered under this id.
    #[error("unknown generator '{0}'")]
    UnknownGenerator(String),

    /// A generator option has the wrong shape.
    #[error("invalid option '{key}': {message}")]
    InvalidOptions { key: String, message: String },

    /// A built-in generator failed.
    #[error("generation failed: {0}")]
    Generation(String),
}

impl GeneratorError {
    /// Create an invalid options error.
    pub fn invalid_option(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Captured plugin stderr, for failures that carry it.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ExitStatus { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Error writing or cleaning generated output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A relative path escapes the output root.
    #[error("invalid output path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// Failed to remove the previous output.
    #[error("failed to clean {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failure attributed to one target.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
