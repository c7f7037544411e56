//! # vdl-cli
//!
//! CLI library for the VDL schema toolchain.
//!
//! This crate provides the core functionality for the `vdl` CLI tool:
//! loading the `vdl.toml` manifest, reading parsed schema documents from
//! disk, and running the configured targets.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Manifest loading and target validation
//! - [`loader`] - File-system source loader for the IR builder
//! - [`commands`] - `generate`, `check`, `ir`, and `init`
//! - [`logging`] - Log subscriber setup
//! - [`error`] - Error types and exit codes

pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;

// Re-export main types for convenience
pub use commands::{GenerateOptions, GenerateReport};
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult, ConfigError};
pub use loader::FsLoader;
